//! Secret chain builder -- wires concrete providers in priority order.
//!
//! This module lives in `propertease-infra` because it assembles concrete
//! provider implementations. The resulting chain is passed to `SecretService`
//! in `propertease-core` via the `DynSecretProvider` abstraction.
//!
//! Chain order: `[EnvSecretProvider, GcpSecretManagerProvider]`

use std::sync::Arc;

use propertease_core::repository::secret::DynSecretProvider;
use propertease_types::config::SecretsConfig;

use crate::secret::env::EnvSecretProvider;
use crate::secret::gcp::GcpSecretManagerProvider;

/// Build the secret resolution chain from configuration.
///
/// The chain is ordered by precedence (first match wins):
/// 1. Environment variables (if `use_env` is true)
/// 2. Google Cloud Secret Manager (if `gcp_project` is set)
pub fn build_secret_chain(config: &SecretsConfig, client: &reqwest::Client) -> Vec<DynSecretProvider> {
    let mut chain: Vec<DynSecretProvider> = Vec::new();

    if config.use_env {
        chain.push(Arc::new(EnvSecretProvider::new()));
    }

    if let Some(project) = &config.gcp_project {
        chain.push(Arc::new(GcpSecretManagerProvider::new(client.clone(), project.clone())));
    }

    chain
}
