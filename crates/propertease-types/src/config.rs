//! Application configuration types for PropertEase.
//!
//! `AppConfig` represents `propertease.toml`. Every section and field has a
//! default, so an empty or missing file yields a working configuration.
//! Credentials never live here: only the names of secrets to resolve.

use serde::{Deserialize, Serialize};

use crate::chat::{ContextMode, DEFAULT_GREETING, FALLBACK_REPLY};
use crate::llm::{ModelSelector, Region};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub chat: ChatConfig,
    pub recommendations: RecommendationConfig,
    pub geocoding: GeocodingConfig,
    pub secrets: SecretsConfig,
    pub local: LocalModelConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Remote generative-model settings shared by both gateways.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub region: Region,
    pub text_model: String,
    pub vision_model: String,
    /// Name of the secret holding the model API key.
    pub api_key_secret: String,
    /// Endpoint base URL. `{region}` is substituted with the selected region.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl ModelConfig {
    pub fn text_selector(&self) -> ModelSelector {
        ModelSelector::new(self.region, self.text_model.clone())
    }

    pub fn vision_selector(&self) -> ModelSelector {
        ModelSelector::new(self.region, self.vision_model.clone())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            region: Region::default(),
            text_model: "gemini-pro".to_string(),
            vision_model: "gemini-pro-vision".to_string(),
            api_key_secret: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_secs: 60,
            max_output_tokens: None,
            temperature: None,
        }
    }
}

/// Conversational state controller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub greeting: String,
    pub fallback_reply: String,
    pub context_mode: ContextMode,
    /// Upper bound on one exchange, after which the fallback reply is used.
    pub exchange_timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            fallback_reply: FALLBACK_REPLY.to_string(),
            context_mode: ContextMode::default(),
            exchange_timeout_secs: 30,
        }
    }
}

/// Listing recommendation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub cache_ttl_secs: u64,
    pub count: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            count: 3,
        }
    }
}

/// Geocoding proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub api_key_secret: String,
    pub base_url: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key_secret: "google-maps-api-key".to_string(),
            base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
        }
    }
}

/// Secret resolution chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Check environment variables first.
    pub use_env: bool,
    /// GCP project for Secret Manager; the provider is skipped when unset.
    pub gcp_project: Option<String>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            use_env: true,
            gcp_project: None,
        }
    }
}

/// Local (on-device) model runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "gemma3".to_string(),
        }
    }
}
