//! Secret provider trait definition.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use secrecy::SecretString;

use propertease_types::error::SecretError;
use propertease_types::secret::SecretKey;

/// Read-only secret source (environment, cloud secret manager).
///
/// The SecretService chains providers in priority order.
pub trait SecretProvider: Send + Sync {
    /// Short name used in logs (e.g., "env", "gcp").
    fn name(&self) -> &str;

    /// Retrieve a secret value by name.
    /// Returns None if the secret does not exist in this provider.
    fn get(
        &self,
        key: &SecretKey,
    ) -> impl Future<Output = Result<Option<SecretString>, SecretError>> + Send;
}

/// Object-safe version of [`SecretProvider`] with boxed futures.
pub trait SecretProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn get_boxed<'a>(
        &'a self,
        key: &'a SecretKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<SecretString>, SecretError>> + Send + 'a>>;
}

impl<T: SecretProvider> SecretProviderDyn for T {
    fn name(&self) -> &str {
        SecretProvider::name(self)
    }

    fn get_boxed<'a>(
        &'a self,
        key: &'a SecretKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<SecretString>, SecretError>> + Send + 'a>> {
        Box::pin(self.get(key))
    }
}

/// Shared, type-erased secret provider as stored in the chain.
pub type DynSecretProvider = Arc<dyn SecretProviderDyn>;
