//! # Single-Flight Groups
//!
//! Keyed coalescing locks for cold-cache fetches.
//!
//! The cache deliberately allows two concurrent misses on the same key to
//! both hit the origin. A [`SingleFlight`] group restores one-fetch
//! semantics: callers acquire the key's lock before fetching and re-check
//! the cache once they hold it, so only the first caller pays for the
//! origin call and the rest find the entry it stored.
//!
//! # Examples
//!
//! ```
//! use cinecompare::infrastructure::cache::SingleFlight;
//!
//! # tokio_test::block_on(async {
//! let group = SingleFlight::new();
//! let _guard = group.acquire("catalog:cinemaworld").await;
//! // re-check the cache, then fetch from origin while holding the guard
//! # });
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A group of keyed async locks.
///
/// Lock entries are created on first use and removed when the last guard
/// for a key is dropped, so the map stays bounded by the number of keys
/// currently in flight.
#[derive(Debug, Default)]
pub struct SingleFlight {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl SingleFlight {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, waiting behind any in-flight holder.
    pub async fn acquire(&self, key: &str) -> FlightGuard {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        let guard = lock.lock_owned().await;
        FlightGuard {
            _guard: guard,
            key: key.to_string(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Returns the number of keys currently tracked.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Guard for one key's flight. Dropping it releases the lock and, if no
/// other caller is waiting, forgets the key.
#[derive(Debug)]
pub struct FlightGuard {
    _guard: OwnedMutexGuard<()>,
    key: String,
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        if let Some(entry) = locks.get(&self.key) {
            // Two strong references mean map + this guard's mutex handle:
            // nobody else is holding or waiting, so the key can go. New
            // callers must take `locks` first, which we hold.
            if Arc::strong_count(entry) <= 2 {
                locks.remove(&self.key);
            }
        }
    }
}
