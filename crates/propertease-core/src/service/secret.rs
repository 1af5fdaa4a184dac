//! Secret resolution service.
//!
//! SecretService resolves secrets through a chain of providers in priority
//! order (environment variables first, then the cloud secret manager).
//!
//! This service lives in `propertease-core` and depends only on the
//! `SecretProvider` port -- never on concrete infra implementations.

use secrecy::SecretString;
use tracing::{debug, warn};

use propertease_types::error::{GatewayError, SecretError};
use propertease_types::secret::SecretKey;

use crate::repository::secret::DynSecretProvider;

/// Resolves named secrets; first provider with a value wins.
pub struct SecretService {
    providers: Vec<DynSecretProvider>,
}

impl SecretService {
    /// Providers should be ordered by precedence (highest priority first).
    pub fn new(providers: Vec<DynSecretProvider>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve a secret by iterating through providers in priority order.
    ///
    /// An unreachable provider is skipped so a later one can still answer.
    pub async fn get(&self, key: &SecretKey) -> Result<Option<SecretString>, SecretError> {
        for provider in &self.providers {
            match provider.get_boxed(key).await {
                Ok(Some(value)) => {
                    debug!(secret = %key, provider = provider.name(), "secret resolved");
                    return Ok(Some(value));
                }
                Ok(None) => continue,
                Err(SecretError::ProviderUnavailable(reason)) => {
                    warn!(secret = %key, provider = provider.name(), %reason, "secret provider unavailable");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Resolve a secret that must exist; absence is a configuration error.
    pub async fn require(&self, key: &SecretKey) -> Result<SecretString, GatewayError> {
        match self.get(key).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(GatewayError::Configuration(format!(
                "secret '{key}' is not set"
            ))),
            Err(e) => Err(GatewayError::Configuration(e.to_string())),
        }
    }
}
