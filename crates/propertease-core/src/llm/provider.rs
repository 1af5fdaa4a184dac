//! ModelProvider trait definition.
//!
//! This is the core abstraction that generative-model backends implement.
//! Uses RPITIT for `generate`, and `Pin<Box<dyn Stream>>` for `stream`
//! (streams need to be object-safe for the BoxModelProvider wrapper).

use std::pin::Pin;

use futures_util::Stream;

use propertease_types::llm::{
    GenerationRequest, GenerationResponse, LlmError, ProviderCapabilities, StreamEvent,
};

/// Trait for generative-model backends (Gemini, test stubs).
///
/// Requests handed to a provider are fully resolved: every image is inline.
/// Implementations live in propertease-infra (e.g., `GeminiProvider`).
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// What this provider supports (streaming, vision).
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a generation request and receive the full response.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<GenerationResponse, LlmError>> + Send;

    /// Send a streaming generation request. Returns a stream of events.
    fn stream(
        &self,
        request: GenerationRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
