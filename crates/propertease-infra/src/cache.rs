//! In-process recommendation cache with per-entry expiry.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use propertease_core::repository::cache::RecommendationCache;
use propertease_types::property::Property;

struct CacheEntry {
    properties: Vec<Property>,
    /// `None` when the TTL runs past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// [`RecommendationCache`] on a concurrent map. Expired entries are dropped
/// when read, and every write sweeps all expired entries.
#[derive(Default)]
pub struct MemoryRecommendationCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryRecommendationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecommendationCache for MemoryRecommendationCache {
    async fn get(&self, key: &str) -> Option<Vec<Property>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.properties.clone());
            }
        }
        // The read guard is released above; remove only if still expired.
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    async fn set(&self, key: &str, properties: Vec<Property>, ttl: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                properties,
                expires_at: now.checked_add(ttl),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str) -> Property {
        Property {
            name: name.to_string(),
            description: "Two-bedroom flat".to_string(),
            price: "$1,800/mo".to_string(),
            market_avg: "$2,000/mo".to_string(),
            image: "https://images.unsplash.com/photo-2".to_string(),
            recommendation_reason: "Near parks".to_string(),
        }
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryRecommendationCache::new();
        cache
            .set("recs:u1", vec![listing("Elm Flat")], Duration::from_secs(3600))
            .await;
        let hit = cache.get("recs:u1").await.unwrap();
        assert_eq!(hit[0].name, "Elm Flat");
        assert!(cache.get("recs:u2").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let cache = MemoryRecommendationCache::new();
        cache.set("recs:u1", vec![listing("A")], Duration::ZERO).await;
        assert!(cache.get("recs:u1").await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_set_sweeps_expired_entries() {
        let cache = MemoryRecommendationCache::new();
        for i in 0..100 {
            cache
                .set(&format!("recs:old{i}"), vec![listing("A")], Duration::from_millis(1))
                .await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        cache.set("recs:new", vec![listing("B")], Duration::from_secs(60)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("recs:new").await.unwrap()[0].name, "B");
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let cache = MemoryRecommendationCache::new();
        cache
            .set("recs:u1", vec![listing("A")], Duration::from_secs(u64::MAX))
            .await;
        assert_eq!(cache.get("recs:u1").await.unwrap()[0].name, "A");
    }

    #[tokio::test]
    async fn test_set_replaces_entry() {
        let cache = MemoryRecommendationCache::new();
        cache.set("recs:u1", vec![listing("A")], Duration::from_secs(60)).await;
        cache.set("recs:u1", vec![listing("B")], Duration::from_secs(60)).await;
        assert_eq!(cache.get("recs:u1").await.unwrap()[0].name, "B");
        assert_eq!(cache.len(), 1);
    }
}
