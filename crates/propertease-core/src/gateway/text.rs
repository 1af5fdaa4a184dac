//! Model gateway: forwards a prompt to the configured remote model and
//! normalizes the reply to plain text.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::Stream;
use tracing::{Instrument, debug, info_span, warn};

use propertease_types::error::GatewayError;
use propertease_types::llm::{ContentPart, GenerationRequest, LlmError, ModelSelector, StreamEvent};

use crate::llm::box_provider::BoxModelProvider;

/// Default bound on one remote model call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Stream of model events returned by [`ModelGateway::stream`].
pub type GatewayStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Stateless mediation between callers and one remote model.
///
/// Cheap to clone: the provider is shared.
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<BoxModelProvider>,
    selector: ModelSelector,
    max_output_tokens: Option<u32>,
    temperature: Option<f64>,
    timeout: Duration,
}

impl ModelGateway {
    pub fn new(provider: Arc<BoxModelProvider>, selector: ModelSelector) -> Self {
        Self {
            provider,
            selector,
            max_output_tokens: None,
            temperature: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_generation_options(
        mut self,
        max_output_tokens: Option<u32>,
        temperature: Option<f64>,
    ) -> Self {
        self.max_output_tokens = max_output_tokens;
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same provider and options, different model endpoint.
    pub fn with_selector(&self, selector: ModelSelector) -> Self {
        Self {
            selector,
            ..self.clone()
        }
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate text for a single prompt.
    ///
    /// A missing or whitespace-only prompt is rejected before any outbound call.
    pub async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        if prompt.trim().is_empty() {
            return Err(GatewayError::Validation("Prompt is required".to_string()));
        }
        self.generate_parts(vec![ContentPart::Text(prompt.to_string())])
            .await
    }

    /// Generate text for already-resolved content parts.
    pub async fn generate_parts(&self, parts: Vec<ContentPart>) -> Result<String, GatewayError> {
        let request = self.build_request(parts);

        let span = info_span!(
            "gen_ai.generate",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.selector.model,
            gen_ai.request.region = %request.selector.region,
            gen_ai.request.max_tokens = ?request.max_output_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = false,
        );

        let call = self.provider.generate(&request).instrument(span);
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| {
                warn!(error = %e, model = %self.selector.model, "model call failed");
                GatewayError::from(e)
            })?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "model call timed out");
                return Err(LlmError::Timeout(self.timeout.as_secs()).into());
            }
        };

        if response.text.trim().is_empty() {
            return Err(GatewayError::Upstream(format!(
                "model returned no text (finish reason: {})",
                response.finish_reason
            )));
        }

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = %response.finish_reason,
            "model call complete"
        );
        Ok(response.text)
    }

    /// Stream text deltas for a single prompt.
    ///
    /// Validation happens up front; provider failures arrive as stream items.
    pub fn stream(&self, prompt: &str) -> Result<GatewayStream, GatewayError> {
        if prompt.trim().is_empty() {
            return Err(GatewayError::Validation("Prompt is required".to_string()));
        }
        let request = self.build_request(vec![ContentPart::Text(prompt.to_string())]);

        let span = info_span!(
            "gen_ai.stream",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.selector.model,
            gen_ai.request.region = %request.selector.region,
            gen_ai.request.stream = true,
        );

        let stream = {
            let _enter = span.enter();
            self.provider.stream(request)
        };
        Ok(Box::pin(StreamInSpan { inner: stream, span }))
    }

    fn build_request(&self, parts: Vec<ContentPart>) -> GenerationRequest {
        GenerationRequest {
            selector: self.selector.clone(),
            parts,
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

/// Keeps the gateway span entered while the provider stream is polled.
struct StreamInSpan {
    inner: GatewayStream,
    span: tracing::Span,
}

impl Stream for StreamInSpan {
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        // Both fields are Unpin, so the wrapper is too.
        let this = self.get_mut();
        let _enter = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}
