//! Model request/response types for PropertEase.
//!
//! These types model the data shapes for generative-model interactions:
//! generation requests over resolved prompts, streaming events, usage
//! tracking, endpoint selection, and error handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::prompt::InlineImage;

/// Data region the model endpoint is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    #[serde(rename = "us-central1")]
    UsCentral1,
    #[serde(rename = "europe-west1")]
    EuropeWest1,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::UsCentral1 => "us-central1",
            Region::EuropeWest1 => "europe-west1",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us-central1" | "us" => Ok(Region::UsCentral1),
            "europe-west1" | "eu" => Ok(Region::EuropeWest1),
            other => Err(format!("invalid region: '{other}'")),
        }
    }
}

/// Which model, in which region, a gateway talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelector {
    pub region: Region,
    pub model: String,
}

impl ModelSelector {
    pub fn new(region: Region, model: impl Into<String>) -> Self {
        Self {
            region,
            model: model.into(),
        }
    }
}

/// A resolved content part ready for the wire. Images are always inline here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(InlineImage),
}

/// Request to a model provider for a generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub selector: ModelSelector,
    pub parts: Vec<ContentPart>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl GenerationRequest {
    /// A text-only request.
    pub fn text(selector: ModelSelector, prompt: impl Into<String>) -> Self {
        Self {
            selector,
            parts: vec![ContentPart::Text(prompt.into())],
            max_output_tokens: None,
            temperature: None,
        }
    }
}

/// Response from a model provider for a non-streaming generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    pub model: String,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

/// Reason why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::MaxTokens => write!(f, "max_tokens"),
            FinishReason::Safety => write!(f, "safety"),
            FinishReason::Other => write!(f, "other"),
        }
    }
}

impl FromStr for FinishReason {
    type Err = String;

    /// Accepts both our snake_case names and the upstream SCREAMING_CASE ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stop" => Ok(FinishReason::Stop),
            "max_tokens" => Ok(FinishReason::MaxTokens),
            "safety" => Ok(FinishReason::Safety),
            "other" => Ok(FinishReason::Other),
            other => Err(format!("invalid finish reason: '{other}'")),
        }
    }
}

/// Token usage for a generation request/response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Events emitted during a streaming generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Connection established with the provider.
    Connected,

    /// A chunk of generated text.
    TextDelta { text: String },

    /// Token usage information.
    Usage(Usage),

    /// The model reported why it stopped.
    Finished { reason: FinishReason },

    /// The stream has completed.
    Done,
}

/// Errors from model provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("response blocked: {0}")]
    Blocked(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Capabilities of a model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub streaming: bool,
    pub vision: bool,
    pub max_output_tokens: u32,
}
