//! # Cache Layer
//!
//! Read-mostly byte cache with per-entry TTL.
//!
//! ## Port
//!
//! - [`Cache`]: `get`/`set` over opaque byte payloads with absolute expiry,
//!   plus first-class invalidation (`invalidate`, `invalidate_prefix`,
//!   `invalidate_all`) so refresh operations never have to reach into cache
//!   internals
//!
//! ## Implementations
//!
//! - [`InMemoryCache`]: dashmap-backed store, expiry checked on read
//! - [`SingleFlight`]: keyed coalescing group callers can pair with the
//!   cache so concurrent identical misses share one origin fetch
//!
//! The cache itself performs no coalescing: two concurrent misses on the
//! same cold key may both trigger the expensive underlying fetch unless the
//! caller opts into [`SingleFlight`].

pub mod memory;
pub mod single_flight;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

pub use memory::InMemoryCache;
pub use single_flight::{FlightGuard, SingleFlight};

/// Port for the shared key/value cache.
///
/// Keys are strings built from an operation name and its arguments
/// (`catalog:{provider}`, `detail:{provider}:{id}`, `all_comparisons`).
/// Values are opaque byte payloads. `set` overwrites unconditionally; there
/// is no cross-key transactionality.
#[async_trait]
pub trait Cache: Send + Sync + fmt::Debug {
    /// Returns the payload stored under `key`, or `None` on a miss or after
    /// TTL expiry.
    async fn get(&self, key: &str) -> Option<Bytes>;

    /// Stores `value` under `key` for `ttl`, overwriting any previous entry.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration);

    /// Removes one entry. Returns true if an entry existed.
    async fn invalidate(&self, key: &str) -> bool;

    /// Removes every entry whose key starts with `prefix`. Returns the
    /// number of removed entries.
    async fn invalidate_prefix(&self, prefix: &str) -> usize;

    /// Removes every entry.
    async fn invalidate_all(&self);
}
