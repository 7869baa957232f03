//! # Provider Transport Port
//!
//! Raw network boundary for one provider.
//!
//! A transport knows how to reach exactly one provider's catalog and detail
//! endpoints and how to issue a bare probe request. It returns raw bytes;
//! parsing, retries, caching and health labeling all live in
//! [`ProviderClient`](crate::infrastructure::providers::client::ProviderClient).
//!
//! # Examples
//!
//! ```ignore
//! use cinecompare::infrastructure::providers::transport::ProviderTransport;
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl ProviderTransport for MyTransport {
//!     // ... implement required methods
//! }
//! ```

use crate::domain::provider::ProviderId;
use crate::infrastructure::providers::error::ProviderResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Port for one provider's raw network operations.
#[async_trait]
pub trait ProviderTransport: Send + Sync + fmt::Debug {
    /// Returns the provider this transport reaches.
    fn provider(&self) -> &ProviderId;

    /// Fetches the provider's full catalog as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`](crate::infrastructure::providers::error::ProviderError)
    /// on any non-success status or transport failure; every variant is
    /// retryable at this layer.
    async fn fetch_catalog(&self) -> ProviderResult<Bytes>;

    /// Fetches one detail record as raw bytes.
    ///
    /// # Errors
    ///
    /// Same contract as [`fetch_catalog`](Self::fetch_catalog).
    async fn fetch_detail(&self, native_id: &str) -> ProviderResult<Bytes>;

    /// Issues a single probe request and returns the HTTP status code,
    /// success or not.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures (no response at
    /// all); non-success statuses are reported through the `Ok` code.
    async fn probe(&self) -> ProviderResult<u16>;
}
