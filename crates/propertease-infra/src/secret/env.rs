//! Environment variable secret provider.
//!
//! A read-only secret provider that checks environment variables.
//! This is the highest-priority provider in the resolution chain:
//! env vars override the cloud secret manager.
//!
//! Key resolution: the name as given (e.g., "GEMINI_API_KEY"), then its
//! env-style spelling ("google-maps-api-key" -> "GOOGLE_MAPS_API_KEY").

use secrecy::SecretString;

use propertease_core::repository::secret::SecretProvider;
use propertease_types::error::SecretError;
use propertease_types::secret::SecretKey;

/// Environment variable secret provider.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn read_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => Some(val),
        // Empty and non-Unicode values count as unset.
        _ => None,
    }
}

impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(&self, key: &SecretKey) -> Result<Option<SecretString>, SecretError> {
        let value = read_var(key.as_str()).or_else(|| {
            let env_name = key.env_var_name();
            (env_name != key.as_str())
                .then(|| read_var(&env_name))
                .flatten()
        });
        Ok(value.map(SecretString::from))
    }
}
