//! GeminiProvider -- concrete [`ModelProvider`] implementation for Google Gemini.
//!
//! Sends requests to `models/{model}:generateContent` (and the SSE variant
//! `:streamGenerateContent?alt=sse`). The model and region come from each
//! request's selector, so one provider serves both the text and vision
//! gateways.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! in the `x-goog-api-key` request header.

use std::pin::Pin;

use base64::Engine;
use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use propertease_core::llm::provider::ModelProvider;
use propertease_types::llm::{
    ContentPart, FinishReason, GenerationRequest, GenerationResponse, LlmError,
    ProviderCapabilities, StreamEvent,
};

use super::streaming::create_gemini_stream;
use super::types::{
    GeminiBlob, GeminiContent, GeminiErrorEnvelope, GeminiGenerationConfig, GeminiPart,
    GeminiRequest, GeminiResponse,
};

/// Public Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini model provider.
///
/// Does not derive Debug; the key must never end up in logs.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    capabilities: ProviderCapabilities,
}

impl GeminiProvider {
    /// `base_url` may contain `{region}`, substituted per request.
    pub fn new(client: reqwest::Client, api_key: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            capabilities: ProviderCapabilities {
                streaming: true,
                vision: true,
                max_output_tokens: 8_192,
            },
        }
    }

    /// Full method URL for the request's model and region.
    fn url(&self, request: &GenerationRequest, method: &str) -> String {
        let base = self
            .base_url
            .replace("{region}", request.selector.region.as_str());
        format!("{base}/models/{}:{method}", request.selector.model)
    }

    /// Convert a generic [`GenerationRequest`] into a [`GeminiRequest`].
    pub(crate) fn to_gemini_request(request: &GenerationRequest) -> GeminiRequest {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => GeminiPart::Text { text: text.clone() },
                ContentPart::Image(image) => GeminiPart::InlineData {
                    inline_data: GeminiBlob {
                        mime_type: image.mime_type.clone(),
                        data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                    },
                },
            })
            .collect();

        let generation_config = (request.max_output_tokens.is_some()
            || request.temperature.is_some())
        .then(|| GeminiGenerationConfig {
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
        });

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config,
        }
    }
}

/// Map a non-success HTTP status and body onto an [`LlmError`].
pub(crate) fn status_error(
    status: reqwest::StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> LlmError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|e| match e.error.status {
            Some(code) => format!("{code}: {}", e.error.message),
            None => e.error.message,
        })
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after.map(|secs| secs * 1000),
        },
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let body = Self::to_gemini_request(request);
        let url = self.url(request, "generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Gemini API error response");
            return Err(status_error(status, retry_after, &error_body));
        }

        let gemini: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        if let Some(reason) = gemini.block_reason() {
            return Err(LlmError::Blocked(format!("prompt blocked: {reason}")));
        }
        if gemini.candidates.is_empty() {
            return Err(LlmError::Blocked("response contained no candidates".to_string()));
        }

        let text = gemini.text();
        let finish_reason = gemini.finish_reason().unwrap_or(FinishReason::Other);
        if text.is_empty() && finish_reason == FinishReason::Safety {
            return Err(LlmError::Blocked("candidate withheld by safety filters".to_string()));
        }

        Ok(GenerationResponse {
            text,
            model: gemini
                .model_version
                .clone()
                .unwrap_or_else(|| request.selector.model.clone()),
            finish_reason,
            usage: gemini.usage(),
        })
    }

    fn stream(
        &self,
        request: GenerationRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = Self::to_gemini_request(&request);
        let url = format!("{}?alt=sse", self.url(&request, "streamGenerateContent"));
        create_gemini_stream(&self.client, &url, body, &self.api_key)
    }
}
