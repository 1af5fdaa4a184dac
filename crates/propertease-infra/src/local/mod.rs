//! On-device model runtimes.

pub mod ollama;

pub use ollama::{OllamaRuntime, OllamaSession};
