//! Infrastructure layer for PropertEase.
//!
//! Contains implementations of the ports defined in `propertease-core`:
//! the Gemini model provider, the HTTP image fetcher, the Ollama local
//! runtime, secret providers (environment, Google Secret Manager), the
//! Google geocoder, the in-memory recommendation cache, and the config loader.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod geocode;
pub mod http;
pub mod llm;
pub mod local;
pub mod secret;
