//! Cross-cutting services built on the repository ports.

pub mod secret;
