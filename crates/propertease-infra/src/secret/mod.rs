//! Secret provider implementations.
//!
//! - `env`: Environment variable provider (read-only, highest priority)
//! - `gcp`: Google Cloud Secret Manager over REST
//! - `chain`: Secret chain builder wiring the providers together

pub mod chain;
pub mod env;
pub mod gcp;

pub use chain::build_secret_chain;
pub use env::EnvSecretProvider;
pub use gcp::GcpSecretManagerProvider;
