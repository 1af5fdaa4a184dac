//! Stub provider and state builders for the router tests.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::Stream;
use secrecy::SecretString;

use propertease_core::llm::box_provider::BoxModelProvider;
use propertease_core::llm::provider::ModelProvider;
use propertease_core::repository::secret::{DynSecretProvider, SecretProvider};
use propertease_core::service::secret::SecretService;
use propertease_types::config::AppConfig;
use propertease_types::error::SecretError;
use propertease_types::llm::{
    FinishReason, GenerationRequest, GenerationResponse, LlmError, ProviderCapabilities,
    StreamEvent, Usage,
};
use propertease_types::secret::SecretKey;

use crate::state::AppState;

/// Model provider answering every request with the same outcome.
#[derive(Clone)]
pub struct StubProvider {
    reply: Result<String, String>,
    delay: Option<Duration>,
    capabilities: ProviderCapabilities,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Self {
        Self::with_outcome(Ok(text.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_outcome(Err(message.to_string()))
    }

    fn with_outcome(reply: Result<String, String>) -> Self {
        Self {
            reply,
            delay: None,
            capabilities: ProviderCapabilities {
                streaming: true,
                vision: true,
                max_output_tokens: 2048,
            },
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(|message| LlmError::Provider { message })
    }
}

impl ModelProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let text = self.next_reply()?;
        Ok(GenerationResponse {
            text,
            model: request.selector.model.clone(),
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        })
    }

    fn stream(
        &self,
        _request: GenerationRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let outcome = self.next_reply();
        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Connected);
            match outcome {
                Ok(text) => {
                    for chunk in text.split_inclusive(' ') {
                        yield Ok(StreamEvent::TextDelta { text: chunk.to_string() });
                    }
                    yield Ok(StreamEvent::Usage(Usage { input_tokens: 3, output_tokens: 2 }));
                    yield Ok(StreamEvent::Done);
                }
                Err(e) => yield Err(e),
            }
        })
    }
}

/// Secret provider holding fixed values.
pub struct StaticSecrets(pub Vec<(&'static str, &'static str)>);

impl SecretProvider for StaticSecrets {
    fn name(&self) -> &str {
        "static"
    }

    async fn get(&self, key: &SecretKey) -> Result<Option<SecretString>, SecretError> {
        Ok(self
            .0
            .iter()
            .find(|(name, _)| *name == key.as_str())
            .map(|(_, value)| SecretString::from(value.to_string())))
    }
}

/// State around `provider` with default config and no secrets.
pub fn test_state(provider: &StubProvider) -> AppState {
    test_state_with(provider, AppConfig::default(), StaticSecrets(Vec::new()))
}

pub fn test_state_with(provider: &StubProvider, config: AppConfig, secrets: StaticSecrets) -> AppState {
    let chain: Vec<DynSecretProvider> = vec![Arc::new(secrets)];
    AppState::from_parts(
        config,
        reqwest::Client::new(),
        BoxModelProvider::new(provider.clone()),
        SecretService::new(chain),
    )
}
