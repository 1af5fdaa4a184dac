//! Local model runtime speaking the Ollama HTTP API on localhost.
//!
//! - probe: `GET /api/tags`; the configured model listed means ready, a
//!   reachable server without it means the model must be pulled first
//! - session: the model is loaded with an empty `POST /api/generate`
//! - prompt: `POST /api/generate` with `stream: false`, images as base64
//! - close: `keep_alive: 0` unloads the model

use base64::Engine;
use serde::{Deserialize, Serialize};

use propertease_core::local::{HostRuntime, LocalSession};
use propertease_types::llm::{ContentPart, LlmError};
use propertease_types::local::{Availability, SessionOptions};
use propertease_types::prompt::Modality;

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Whether a tag name refers to `model` (`gemma3` matches `gemma3:latest`).
fn tag_matches(tag: &str, model: &str) -> bool {
    tag == model
        || tag
            .strip_prefix(model)
            .is_some_and(|rest| rest.starts_with(':'))
}

async fn post_generate(
    client: &reqwest::Client,
    base_url: &str,
    body: &GenerateRequest<'_>,
) -> Result<GenerateResponse, LlmError> {
    let response = client
        .post(format!("{base_url}/api/generate"))
        .json(body)
        .send()
        .await
        .map_err(|e| LlmError::Provider {
            message: format!("local runtime unreachable: {e}"),
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(LlmError::Provider {
            message: format!("local runtime returned HTTP {status}: {error_body}"),
        });
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::Deserialization(format!("local runtime response: {e}")))
}

/// Host runtime backed by a local Ollama server.
#[derive(Clone)]
pub struct OllamaRuntime {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaRuntime {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl HostRuntime for OllamaRuntime {
    type Session = OllamaSession;

    async fn probe(&self) -> Availability {
        let response = match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(status = %response.status(), "local runtime probe failed");
                return Availability::No;
            }
            Err(e) => {
                tracing::debug!(error = %e, "local runtime not reachable");
                return Availability::No;
            }
        };

        match response.json::<TagsResponse>().await {
            Ok(tags) if tags.models.iter().any(|m| tag_matches(&m.name, &self.model)) => {
                Availability::ReadilyAvailable
            }
            Ok(_) => Availability::AfterDownload,
            Err(e) => {
                tracing::debug!(error = %e, "unexpected local runtime tags response");
                Availability::No
            }
        }
    }

    async fn create_session(&self, options: &SessionOptions) -> Result<OllamaSession, LlmError> {
        if options.expected_outputs.iter().any(|m| *m != Modality::Text) {
            return Err(LlmError::InvalidRequest(
                "local runtime only produces text output".to_string(),
            ));
        }

        // Load the model into memory ahead of the first prompt.
        post_generate(
            &self.client,
            &self.base_url,
            &GenerateRequest {
                model: &self.model,
                prompt: None,
                images: Vec::new(),
                stream: false,
                keep_alive: None,
            },
        )
        .await?;
        tracing::info!(model = %self.model, "local model loaded");

        Ok(OllamaSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            options: options.clone(),
        })
    }
}

/// A loaded model bound to the session's declared modalities.
pub struct OllamaSession {
    client: reqwest::Client,
    base_url: String,
    model: String,
    options: SessionOptions,
}

impl LocalSession for OllamaSession {
    async fn prompt(&self, parts: Vec<ContentPart>) -> Result<String, LlmError> {
        let mut texts = Vec::new();
        let mut images = Vec::new();
        for part in parts {
            match part {
                ContentPart::Text(text) => texts.push(text),
                ContentPart::Image(image) => {
                    if !self.options.accepts(Modality::Image) {
                        return Err(LlmError::InvalidRequest(
                            "session was not created for image input".to_string(),
                        ));
                    }
                    images.push(base64::engine::general_purpose::STANDARD.encode(&image.bytes));
                }
            }
        }

        let response = post_generate(
            &self.client,
            &self.base_url,
            &GenerateRequest {
                model: &self.model,
                prompt: Some(texts.join("\n")),
                images,
                stream: false,
                keep_alive: None,
            },
        )
        .await?;
        Ok(response.response)
    }

    async fn close(&self) {
        let unload = GenerateRequest {
            model: &self.model,
            prompt: None,
            images: Vec::new(),
            stream: false,
            keep_alive: Some(0),
        };
        if let Err(e) = post_generate(&self.client, &self.base_url, &unload).await {
            tracing::warn!(error = %e, "failed to unload local model");
        }
    }
}
