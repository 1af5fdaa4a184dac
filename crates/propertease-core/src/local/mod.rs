//! On-device model sessions.
//!
//! - `HostRuntime` / `LocalSession`: ports for a model running next to the caller
//! - `LocalSessionManager`: capability probe, session negotiation, single-turn prompts

pub mod manager;
pub mod runtime;

pub use manager::LocalSessionManager;
pub use runtime::{HostCapability, HostRuntime, LocalSession};
