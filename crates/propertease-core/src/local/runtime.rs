//! Host runtime traits for on-device models.

use propertease_types::llm::{ContentPart, LlmError};
use propertease_types::local::{Availability, SessionOptions};

/// A negotiated session with a local model.
///
/// Created once and reused for every prompt until closed.
pub trait LocalSession: Send + Sync {
    /// Submit one prompt and wait for the complete text reply.
    fn prompt(
        &self,
        parts: Vec<ContentPart>,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// Ask the runtime to free whatever the session holds.
    fn close(&self) -> impl std::future::Future<Output = ()> + Send;
}

/// The local model runtime of the current environment.
pub trait HostRuntime: Send + Sync {
    type Session: LocalSession + 'static;

    /// Query availability. Must not change runtime state.
    fn probe(&self) -> impl std::future::Future<Output = Availability> + Send;

    /// Create a session declaring the modalities it will be used with.
    fn create_session(
        &self,
        options: &SessionOptions,
    ) -> impl std::future::Future<Output = Result<Self::Session, LlmError>> + Send;
}

/// Whether the environment offers a local model runtime at all.
pub enum HostCapability<R> {
    Available(R),
    /// No runtime; the reason is shown to the user.
    Unavailable(String),
}

impl<R> HostCapability<R> {
    pub fn is_available(&self) -> bool {
        matches!(self, HostCapability::Available(_))
    }
}
