//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over fetcher/cache/geocoder/runtime traits, but
//! AppState pins them to the concrete infra implementations.

use std::sync::Arc;
use std::time::Duration;

use propertease_core::chat::ConversationController;
use propertease_core::gateway::{ModelGateway, VisionGateway};
use propertease_core::listing::{GeocodingService, RecommendationService};
use propertease_core::llm::box_provider::BoxModelProvider;
use propertease_core::local::{HostCapability, LocalSessionManager};
use propertease_core::service::secret::SecretService;
use propertease_infra::cache::MemoryRecommendationCache;
use propertease_infra::fetch::HttpImageFetcher;
use propertease_infra::geocode::GoogleGeocoder;
use propertease_infra::http::build_client;
use propertease_infra::llm::create_provider;
use propertease_infra::local::OllamaRuntime;
use propertease_infra::secret::chain::build_secret_chain;
use propertease_types::config::{AppConfig, LocalModelConfig};
use propertease_types::secret::SecretKey;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteVisionGateway = VisionGateway<HttpImageFetcher>;

pub type ConcreteRecommendationService = RecommendationService<MemoryRecommendationCache>;

pub type ConcreteGeocodingService = GeocodingService<GoogleGeocoder>;

pub type ConcreteLocalManager = LocalSessionManager<OllamaRuntime, HttpImageFetcher>;

/// On-device session manager for the local runtime described by `config`.
///
/// Independent of [`AppState`]: it needs neither the model key nor the
/// secret chain.
pub fn local_manager(config: &AppConfig) -> anyhow::Result<ConcreteLocalManager> {
    let client = build_client(Duration::from_secs(config.model.request_timeout_secs))?;
    let host = local_host(&config.local, &client);
    Ok(LocalSessionManager::new(host, Arc::new(HttpImageFetcher::new(client))))
}

/// The local runtime described by `config`, or the reason there is none.
fn local_host(config: &LocalModelConfig, client: &reqwest::Client) -> HostCapability<OllamaRuntime> {
    if config.enabled {
        HostCapability::Available(OllamaRuntime::new(
            client.clone(),
            config.base_url.clone(),
            config.model.clone(),
        ))
    } else {
        HostCapability::Unavailable("local model runtime is disabled in configuration".to_string())
    }
}

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: ModelGateway,
    pub vision: Arc<ConcreteVisionGateway>,
    pub chat: Arc<ConversationController>,
    pub recommendations: Arc<ConcreteRecommendationService>,
    pub geocoding: Arc<ConcreteGeocodingService>,
}

impl AppState {
    /// Initialize the application state: resolve the model key, wire services.
    ///
    /// Fails when the model API key cannot be resolved through the secret chain.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let client = build_client(Duration::from_secs(config.model.request_timeout_secs))?;

        let secret_chain = build_secret_chain(&config.secrets, &client);
        let secret_service = SecretService::new(secret_chain);
        tracing::debug!(providers = ?secret_service.provider_names(), "secret chain ready");

        let api_key = secret_service
            .require(&SecretKey::new(config.model.api_key_secret.clone()))
            .await?;
        let provider = create_provider(&config.model, client.clone(), api_key);

        Ok(Self::from_parts(config, client, provider, secret_service))
    }

    /// Wire every service around an already-built provider and secret chain.
    pub fn from_parts(
        config: AppConfig,
        client: reqwest::Client,
        provider: BoxModelProvider,
        secret_service: SecretService,
    ) -> Self {
        let provider = Arc::new(provider);
        let secret_service = Arc::new(secret_service);
        let fetcher = Arc::new(HttpImageFetcher::new(client.clone()));

        let gateway = ModelGateway::new(provider, config.model.text_selector())
            .with_generation_options(config.model.max_output_tokens, config.model.temperature)
            .with_timeout(Duration::from_secs(config.model.request_timeout_secs));
        let vision = VisionGateway::new(
            gateway.with_selector(config.model.vision_selector()),
            fetcher,
        );

        let chat = ConversationController::new(gateway.clone(), &config.chat);

        let recommendations = RecommendationService::new(
            gateway.clone(),
            Arc::new(MemoryRecommendationCache::new()),
            &config.recommendations,
        );

        let geocoding = GeocodingService::new(
            GoogleGeocoder::new(client, config.geocoding.base_url.clone()),
            secret_service.clone(),
            SecretKey::new(config.geocoding.api_key_secret.clone()),
        );

        Self {
            config: Arc::new(config),
            gateway,
            vision: Arc::new(vision),
            chat: Arc::new(chat),
            recommendations: Arc::new(recommendations),
            geocoding: Arc::new(geocoding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propertease_types::local::{Availability, LocalSessionState};

    #[tokio::test]
    async fn test_init_without_model_key_fails() {
        let mut config = AppConfig::default();
        config.secrets.use_env = false;
        let err = AppState::init(config).await.err().unwrap();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_disabled_local_runtime_is_unavailable() {
        let mut config = AppConfig::default();
        config.local.enabled = false;
        let manager = local_manager(&config).unwrap();

        assert_eq!(manager.probe().await, Availability::No);
        let state = manager.initialize().await;
        assert!(matches!(state, LocalSessionState::Unavailable { ref reason } if reason.contains("disabled")));
    }
}
