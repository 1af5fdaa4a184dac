//! Model provider implementations.
//!
//! Contains the Gemini implementation of the [`ModelProvider`] trait defined
//! in `propertease-core`, plus a factory that builds it from configuration.
//!
//! [`ModelProvider`]: propertease_core::llm::provider::ModelProvider

pub mod gemini;

use secrecy::SecretString;

use propertease_core::llm::box_provider::BoxModelProvider;
use propertease_types::config::ModelConfig;

use self::gemini::GeminiProvider;

/// Create the remote model provider described by `config`.
///
/// The key has already been resolved through the secret chain.
pub fn create_provider(
    config: &ModelConfig,
    client: reqwest::Client,
    api_key: SecretString,
) -> BoxModelProvider {
    BoxModelProvider::new(GeminiProvider::new(client, api_key, config.base_url.clone()))
}
