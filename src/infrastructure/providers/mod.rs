//! # Provider Integration
//!
//! Everything needed to talk to one upstream movie provider.
//!
//! ## Port
//!
//! - [`ProviderTransport`]: raw catalog/detail/probe requests for one
//!   provider, returning bytes or a [`ProviderError`]
//!
//! ## Adapters and policies
//!
//! - [`HttpTransport`]: reqwest-backed transport with the upstream access
//!   token on every request
//! - [`ProviderClient`]: the reliable surface — retry with exponential
//!   backoff, positive/negative response caching, and a hard-timeout health
//!   probe, all over any transport
//! - [`RetryPolicy`]: attempts and backoff knobs for the client

pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{ProviderClient, RetryPolicy};
pub use error::{ProviderError, ProviderResult};
pub use http::HttpTransport;
pub use transport::ProviderTransport;
