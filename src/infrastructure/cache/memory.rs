//! # In-Memory Cache
//!
//! Dashmap-backed implementation of [`Cache`].
//!
//! Entries carry an absolute expiry instant and are dropped lazily when a
//! read finds them expired; there is no eviction policy beyond TTL.
//! Expiry uses `tokio::time::Instant`, so tests can drive it under paused
//! time.
//!
//! # Examples
//!
//! ```
//! use cinecompare::infrastructure::cache::{Cache, InMemoryCache};
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let cache = InMemoryCache::new();
//! cache.set("catalog:cinemaworld", Bytes::from_static(b"{}"), Duration::from_secs(300)).await;
//! assert!(cache.get("catalog:cinemaworld").await.is_some());
//! # });
//! ```

use crate::infrastructure::cache::Cache;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheSlot {
    value: Bytes,
    expires_at: Instant,
}

/// In-memory implementation of [`Cache`].
///
/// Cloning is cheap and shares the underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    slots: Arc<DashMap<String, CacheSlot>>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.slots.iter().filter(|slot| slot.expires_at > now).count()
    }

    /// Returns true if the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Bytes> {
        let expired = match self.slots.get(key) {
            Some(slot) if slot.expires_at > Instant::now() => return Some(slot.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            // Drop the stale slot so the map does not grow unbounded.
            self.slots
                .remove_if(key, |_, slot| slot.expires_at <= Instant::now());
        }
        None
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        let slot = CacheSlot {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.slots.insert(key.to_string(), slot);
    }

    async fn invalidate(&self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let before = self.slots.len();
        self.slots.retain(|key, _| !key.starts_with(prefix));
        before.saturating_sub(self.slots.len())
    }

    async fn invalidate_all(&self) {
        self.slots.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(text: &str) -> Bytes {
        Bytes::copy_from_slice(text.as_bytes())
    }

    #[tokio::test]
    async fn set_then_get() {
        let cache = InMemoryCache::new();
        cache.set("k", payload("v"), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(payload("v")));
    }

    #[tokio::test]
    async fn miss_on_unknown_key() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("nope").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        cache.set("k", payload("v"), Duration::from_secs(60)).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_unconditionally() {
        let cache = InMemoryCache::new();
        cache.set("k", payload("old"), Duration::from_secs(60)).await;
        cache.set("k", payload("new"), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(payload("new")));
    }

    #[tokio::test]
    async fn invalidate_single_key() {
        let cache = InMemoryCache::new();
        cache.set("k", payload("v"), Duration::from_secs(60)).await;
        assert!(cache.invalidate("k").await);
        assert!(!cache.invalidate("k").await);
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn invalidate_prefix_only_touches_matches() {
        let cache = InMemoryCache::new();
        cache.set("catalog:a", payload("1"), Duration::from_secs(60)).await;
        cache.set("catalog:b", payload("2"), Duration::from_secs(60)).await;
        cache.set("detail:a:1", payload("3"), Duration::from_secs(60)).await;

        assert_eq!(cache.invalidate_prefix("catalog:").await, 2);
        assert_eq!(cache.get("catalog:a").await, None);
        assert!(cache.get("detail:a:1").await.is_some());
    }

    #[tokio::test]
    async fn invalidate_all_clears_everything() {
        let cache = InMemoryCache::new();
        cache.set("a", payload("1"), Duration::from_secs(60)).await;
        cache.set("b", payload("2"), Duration::from_secs(60)).await;
        cache.invalidate_all().await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn concurrent_get_set_on_same_key() {
        let cache = InMemoryCache::new();
        let mut tasks = Vec::new();
        for i in 0..32 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .set("hot", payload(&format!("v{i}")), Duration::from_secs(60))
                    .await;
                cache.get("hot").await
            }));
        }
        for task in tasks {
            // Every read observes some complete write, never torn state.
            let got = task.await.unwrap();
            assert!(got.is_some());
        }
    }
}
