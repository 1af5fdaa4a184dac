//! Recommendation cache trait.

use std::future::Future;
use std::time::Duration;

use propertease_types::property::Property;

/// Key/value cache for generated recommendations, with per-entry expiry.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in propertease-infra.
pub trait RecommendationCache: Send + Sync {
    /// Get the cached listings for a key. Expired entries read as None.
    fn get(&self, key: &str) -> impl Future<Output = Option<Vec<Property>>> + Send;

    /// Store listings for a key, replacing any previous entry.
    fn set(
        &self,
        key: &str,
        properties: Vec<Property>,
        ttl: Duration,
    ) -> impl Future<Output = ()> + Send;
}
