//! LocalSessionManager -- lifecycle of the on-device model session.
//!
//! State machine: `Uninitialized -> Checking -> Ready | Unavailable`.
//! Initialization runs at most once per manager. An unavailable manager is
//! never retried implicitly; callers construct a new one after the
//! environment changes.

use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, OnceCell};
use tracing::{Instrument, info, info_span, warn};

use propertease_types::error::GatewayError;
use propertease_types::local::{Availability, LocalSessionState, SessionOptions};
use propertease_types::prompt::{ImageInput, Prompt};

use crate::gateway::fetch::{ImageFetcher, resolve_prompt};

use super::runtime::{HostCapability, HostRuntime, LocalSession};

/// Owns the host capability, the negotiated session and its state.
pub struct LocalSessionManager<R: HostRuntime, F: ImageFetcher> {
    host: HostCapability<R>,
    fetcher: Arc<F>,
    options: SessionOptions,
    state: RwLock<LocalSessionState>,
    session: Mutex<Option<R::Session>>,
    initialized: OnceCell<()>,
}

impl<R: HostRuntime, F: ImageFetcher> LocalSessionManager<R, F> {
    /// Manager declaring text and image inputs with text output.
    pub fn new(host: HostCapability<R>, fetcher: Arc<F>) -> Self {
        Self::with_options(host, fetcher, SessionOptions::multimodal())
    }

    pub fn with_options(host: HostCapability<R>, fetcher: Arc<F>, options: SessionOptions) -> Self {
        Self {
            host,
            fetcher,
            options,
            state: RwLock::new(LocalSessionState::Uninitialized),
            session: Mutex::new(None),
            initialized: OnceCell::new(),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LocalSessionState {
        self.state.read().expect("session state lock poisoned").clone()
    }

    fn set_state(&self, state: LocalSessionState) {
        *self.state.write().expect("session state lock poisoned") = state;
    }

    /// Query the runtime's availability without touching manager state.
    pub async fn probe(&self) -> Availability {
        match &self.host {
            HostCapability::Available(runtime) => runtime.probe().await,
            HostCapability::Unavailable(_) => Availability::No,
        }
    }

    /// Probe the runtime and negotiate a session.
    ///
    /// Runs once; later calls return the state reached by the first.
    pub async fn initialize(&self) -> LocalSessionState {
        let span = info_span!("local.initialize");
        self.initialized
            .get_or_init(|| self.negotiate().instrument(span))
            .await;
        self.state()
    }

    async fn negotiate(&self) {
        self.set_state(LocalSessionState::Checking);

        let runtime = match &self.host {
            HostCapability::Available(runtime) => runtime,
            HostCapability::Unavailable(reason) => {
                warn!(%reason, "no local model runtime");
                self.set_state(LocalSessionState::Unavailable {
                    reason: format!("Local model runtime is not available: {reason}"),
                });
                return;
            }
        };

        let availability = runtime.probe().await;
        if availability != Availability::ReadilyAvailable {
            warn!(%availability, "local model not ready");
            self.set_state(LocalSessionState::Unavailable {
                reason: format!("AI model not readily available. Status: {availability}"),
            });
            return;
        }

        match runtime.create_session(&self.options).await {
            Ok(session) => {
                *self.session.lock().await = Some(session);
                info!("local model session ready");
                self.set_state(LocalSessionState::Ready);
            }
            Err(e) => {
                warn!(error = %e, "failed to create local model session");
                self.set_state(LocalSessionState::Unavailable {
                    reason: format!("Error initializing AI session: {e}"),
                });
            }
        }
    }

    /// Submit one prompt built from optional text and an optional image URL.
    ///
    /// A failed submission leaves the state unchanged.
    pub async fn submit(
        &self,
        text: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<String, GatewayError> {
        let session = self.session.lock().await;
        let Some(session) = session.as_ref() else {
            return Err(GatewayError::Session(
                "AI session not initialized".to_string(),
            ));
        };

        let text = text.map(str::trim).filter(|t| !t.is_empty());
        let image_url = image_url.map(str::trim).filter(|u| !u.is_empty());
        if text.is_none() && image_url.is_none() {
            return Err(GatewayError::Validation(
                "Please upload an image or enter a text prompt.".to_string(),
            ));
        }

        let mut prompt = Prompt::new();
        if let Some(text) = text {
            prompt = prompt.with_text(text);
        }
        if let Some(url) = image_url {
            prompt = prompt.with_image(ImageInput::Url(url.to_string()));
        }
        let parts = resolve_prompt(self.fetcher.as_ref(), prompt).await?;

        let span = info_span!("local.prompt", parts = parts.len());
        let reply = session.prompt(parts).instrument(span).await.map_err(|e| {
            warn!(error = %e, "local prompt failed");
            GatewayError::Upstream(e.to_string())
        })?;
        Ok(reply)
    }

    /// Discard the session and let the runtime free it.
    pub async fn release(&self) {
        if let Some(session) = self.session.lock().await.take() {
            session.close().await;
            info!("local model session released");
            self.set_state(LocalSessionState::Unavailable {
                reason: "Session released".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubFetcher, StubRuntime};
    use propertease_types::llm::ContentPart;
    use propertease_types::prompt::Modality;

    fn manager(runtime: StubRuntime) -> LocalSessionManager<StubRuntime, StubFetcher> {
        LocalSessionManager::new(
            HostCapability::Available(runtime),
            Arc::new(StubFetcher::image("image/png", vec![1, 2, 3])),
        )
    }

    #[tokio::test]
    async fn test_ready_after_successful_negotiation() {
        let runtime = StubRuntime::ready("hi there");
        let mgr = manager(runtime.clone());
        assert_eq!(mgr.state(), LocalSessionState::Uninitialized);
        assert_eq!(mgr.initialize().await, LocalSessionState::Ready);

        let options = runtime.session_options().unwrap();
        assert!(options.accepts(Modality::Text));
        assert!(options.accepts(Modality::Image));
        assert_eq!(options.expected_outputs, vec![Modality::Text]);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let runtime = StubRuntime::ready("hi");
        let mgr = manager(runtime.clone());
        mgr.initialize().await;
        mgr.initialize().await;
        assert_eq!(runtime.sessions_created(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_host_rejects_submissions() {
        let mgr: LocalSessionManager<StubRuntime, StubFetcher> = LocalSessionManager::new(
            HostCapability::Unavailable("no runtime configured".to_string()),
            Arc::new(StubFetcher::untyped(vec![1])),
        );
        let state = mgr.initialize().await;
        assert!(matches!(
            state,
            LocalSessionState::Unavailable { ref reason } if reason.contains("no runtime configured")
        ));

        let err = mgr.submit(Some("hello"), None).await.unwrap_err();
        assert_eq!(err.kind(), "session");
    }

    #[tokio::test]
    async fn test_download_pending_is_unavailable() {
        let mgr = manager(StubRuntime::with_availability(Availability::AfterDownload));
        let state = mgr.initialize().await;
        assert_eq!(
            state,
            LocalSessionState::Unavailable {
                reason: "AI model not readily available. Status: after-download".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_session_creation_failure_is_unavailable() {
        let mgr = manager(StubRuntime::ready("unused").refusing_sessions());
        let state = mgr.initialize().await;
        assert!(!state.is_ready());
        assert!(mgr.submit(Some("hello"), None).await.is_err());
    }

    #[tokio::test]
    async fn test_submit_before_initialize_is_session_error() {
        let mgr = manager(StubRuntime::ready("unused"));
        let err = mgr.submit(None, None).await.unwrap_err();
        // Readiness is checked before input.
        assert_eq!(err.kind(), "session");
    }

    #[tokio::test]
    async fn test_submit_requires_text_or_image() {
        let mgr = manager(StubRuntime::ready("unused"));
        mgr.initialize().await;
        let err = mgr.submit(Some("  "), Some("")).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Validation("Please upload an image or enter a text prompt.".to_string())
        );
    }

    #[tokio::test]
    async fn test_submit_resolves_image_before_prompting() {
        let runtime = StubRuntime::ready("A blue sofa");
        let mgr = manager(runtime.clone());
        mgr.initialize().await;

        let reply = mgr
            .submit(Some("What is this?"), Some("https://example.com/sofa.png"))
            .await
            .unwrap();
        assert_eq!(reply, "A blue sofa");

        let parts = runtime.last_prompt().unwrap();
        assert_eq!(parts[0], ContentPart::Text("What is this?".to_string()));
        assert!(matches!(&parts[1], ContentPart::Image(img) if img.bytes == vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_ready_state() {
        let runtime = StubRuntime::ready("unused").failing_prompts();
        let mgr = manager(runtime);
        mgr.initialize().await;

        let err = mgr.submit(Some("hello"), None).await.unwrap_err();
        assert_eq!(err.kind(), "upstream");
        assert_eq!(mgr.state(), LocalSessionState::Ready);
    }

    #[tokio::test]
    async fn test_probe_is_idempotent() {
        let mgr = manager(StubRuntime::with_availability(Availability::AfterDownload));
        let first = mgr.probe().await;
        let second = mgr.probe().await;
        assert_eq!(first, second);
        assert_eq!(mgr.state(), LocalSessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_release_closes_session() {
        let runtime = StubRuntime::ready("hi");
        let mgr = manager(runtime.clone());
        mgr.initialize().await;
        mgr.release().await;

        assert!(runtime.closed());
        assert!(!mgr.state().is_ready());
        assert_eq!(mgr.submit(Some("hello"), None).await.unwrap_err().kind(), "session");
    }
}
