//! In-memory stand-ins for the ports, shared by the unit tests.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use propertease_types::error::{GatewayError, SecretError};
use propertease_types::geocode::GeocodeResult;
use propertease_types::llm::{
    ContentPart, FinishReason, GenerationRequest, GenerationResponse, LlmError,
    ModelSelector, ProviderCapabilities, Region, StreamEvent, Usage,
};
use propertease_types::local::{Availability, SessionOptions};
use propertease_types::property::Property;
use propertease_types::secret::SecretKey;

use crate::gateway::{FetchedImage, ImageFetcher, ModelGateway, VisionGateway};
use crate::listing::Geocoder;
use crate::llm::box_provider::BoxModelProvider;
use crate::llm::provider::ModelProvider;
use crate::local::{HostRuntime, LocalSession};
use crate::repository::cache::RecommendationCache;
use crate::repository::secret::SecretProvider;

#[derive(Clone)]
enum Reply {
    Fixed(String),
    Echo,
    Fail(String),
}

/// Model provider with a scripted reply that records every request.
#[derive(Clone)]
pub struct StubProvider {
    reply: Reply,
    delay: Option<Duration>,
    capabilities: ProviderCapabilities,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl StubProvider {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            delay: None,
            capabilities: ProviderCapabilities {
                streaming: true,
                vision: true,
                max_output_tokens: 2048,
            },
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with_reply(Reply::Fixed(text.to_string()))
    }

    /// Replies with the text parts of the request.
    pub fn echoing() -> Self {
        Self::with_reply(Reply::Echo)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_reply(Reply::Fail(message.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn record(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Echo => Ok(request
                .parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text(t) => Some(t.as_str()),
                    ContentPart::Image(_) => None,
                })
                .collect::<Vec<_>>()
                .join("\n")),
            Reply::Fail(message) => Err(LlmError::Provider {
                message: message.clone(),
            }),
        }
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
        let text = self.record(request)?;
        Ok(GenerationResponse {
            text,
            model: request.selector.model.clone(),
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        })
    }

    fn stream(
        &self,
        request: GenerationRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let outcome = self.record(&request);
        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Connected);
            match outcome {
                Ok(text) => {
                    for chunk in text.split_inclusive(' ') {
                        yield Ok(StreamEvent::TextDelta { text: chunk.to_string() });
                    }
                    yield Ok(StreamEvent::Finished { reason: FinishReason::Stop });
                    yield Ok(StreamEvent::Done);
                }
                Err(e) => yield Err(e),
            }
        })
    }
}

pub fn text_gateway(provider: &StubProvider) -> ModelGateway {
    ModelGateway::new(
        Arc::new(BoxModelProvider::new(provider.clone())),
        ModelSelector::new(Region::UsCentral1, "gemini-pro"),
    )
}

pub fn vision_gateway(provider: &StubProvider, fetcher: &StubFetcher) -> VisionGateway<StubFetcher> {
    let model = text_gateway(provider)
        .with_selector(ModelSelector::new(Region::UsCentral1, "gemini-pro-vision"));
    VisionGateway::new(model, Arc::new(fetcher.clone()))
}

/// Image fetcher serving one canned response.
#[derive(Clone)]
pub struct StubFetcher {
    outcome: Result<FetchedImage, String>,
    calls: Arc<AtomicUsize>,
}

impl StubFetcher {
    pub fn image(content_type: &str, bytes: Vec<u8>) -> Self {
        Self::from_outcome(Ok(FetchedImage {
            content_type: Some(content_type.to_string()),
            bytes,
        }))
    }

    pub fn untyped(bytes: Vec<u8>) -> Self {
        Self::from_outcome(Ok(FetchedImage {
            content_type: None,
            bytes,
        }))
    }

    pub fn failing(message: &str) -> Self {
        Self::from_outcome(Err(message.to_string()))
    }

    fn from_outcome(outcome: Result<FetchedImage, String>) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedImage, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(GatewayError::Fetch)
    }
}

#[derive(Default)]
struct RuntimeLog {
    options: Option<SessionOptions>,
    sessions_created: usize,
    prompts: Vec<Vec<ContentPart>>,
}

/// Local runtime with a fixed availability and canned replies.
#[derive(Clone)]
pub struct StubRuntime {
    availability: Availability,
    reply: String,
    refuse_sessions: bool,
    fail_prompts: bool,
    log: Arc<Mutex<RuntimeLog>>,
    closed: Arc<AtomicBool>,
}

impl StubRuntime {
    pub fn ready(reply: &str) -> Self {
        Self {
            availability: Availability::ReadilyAvailable,
            reply: reply.to_string(),
            refuse_sessions: false,
            fail_prompts: false,
            log: Arc::new(Mutex::new(RuntimeLog::default())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_availability(availability: Availability) -> Self {
        Self {
            availability,
            ..Self::ready("")
        }
    }

    pub fn refusing_sessions(mut self) -> Self {
        self.refuse_sessions = true;
        self
    }

    pub fn failing_prompts(mut self) -> Self {
        self.fail_prompts = true;
        self
    }

    pub fn session_options(&self) -> Option<SessionOptions> {
        self.log.lock().unwrap().options.clone()
    }

    pub fn sessions_created(&self) -> usize {
        self.log.lock().unwrap().sessions_created
    }

    pub fn last_prompt(&self) -> Option<Vec<ContentPart>> {
        self.log.lock().unwrap().prompts.last().cloned()
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl HostRuntime for StubRuntime {
    type Session = StubRuntime;

    async fn probe(&self) -> Availability {
        self.availability.clone()
    }

    async fn create_session(&self, options: &SessionOptions) -> Result<StubRuntime, LlmError> {
        if self.refuse_sessions {
            return Err(LlmError::Provider {
                message: "model failed to load".to_string(),
            });
        }
        let mut log = self.log.lock().unwrap();
        log.options = Some(options.clone());
        log.sessions_created += 1;
        Ok(self.clone())
    }
}

impl LocalSession for StubRuntime {
    async fn prompt(&self, parts: Vec<ContentPart>) -> Result<String, LlmError> {
        self.log.lock().unwrap().prompts.push(parts);
        if self.fail_prompts {
            return Err(LlmError::Provider {
                message: "generation failed".to_string(),
            });
        }
        Ok(self.reply.clone())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Secret provider backed by a map.
pub struct StubSecrets {
    name: String,
    values: HashMap<String, String>,
    unavailable: bool,
}

impl StubSecrets {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: HashMap::new(),
            unavailable: false,
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl SecretProvider for StubSecrets {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &SecretKey) -> Result<Option<SecretString>, SecretError> {
        if self.unavailable {
            return Err(SecretError::ProviderUnavailable("offline".to_string()));
        }
        Ok(self
            .values
            .get(key.as_str())
            .map(|v| SecretString::from(v.clone())))
    }
}

/// Cache without expiry that remembers the last `set` call.
#[derive(Default)]
pub struct StubCache {
    entries: Mutex<HashMap<String, Vec<Property>>>,
    last_set: Mutex<Option<(String, Duration)>>,
}

impl StubCache {
    pub fn last_set(&self) -> Option<(String, Duration)> {
        self.last_set.lock().unwrap().clone()
    }
}

impl RecommendationCache for StubCache {
    async fn get(&self, key: &str) -> Option<Vec<Property>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, properties: Vec<Property>, ttl: Duration) {
        self.entries.lock().unwrap().insert(key.to_string(), properties);
        *self.last_set.lock().unwrap() = Some((key.to_string(), ttl));
    }
}

/// Geocoder returning canned results and recording (address, key).
#[derive(Clone)]
pub struct StubGeocoder {
    results: Vec<GeocodeResult>,
    last_call: Arc<Mutex<Option<(String, String)>>>,
}

impl StubGeocoder {
    pub fn returning(results: Vec<GeocodeResult>) -> Self {
        Self {
            results,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    pub fn last_call(&self) -> Option<(String, String)> {
        self.last_call.lock().unwrap().clone()
    }
}

impl Geocoder for StubGeocoder {
    async fn geocode(
        &self,
        address: &str,
        api_key: &SecretString,
    ) -> Result<Vec<GeocodeResult>, GatewayError> {
        *self.last_call.lock().unwrap() =
            Some((address.to_string(), api_key.expose_secret().to_string()));
        Ok(self.results.clone())
    }
}
