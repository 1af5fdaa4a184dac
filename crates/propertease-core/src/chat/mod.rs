//! Conversational state: the transcript and the controller that drives it.

pub mod controller;
pub mod transcript;

pub use controller::{ConversationController, PendingExchange};
pub use transcript::Transcript;
