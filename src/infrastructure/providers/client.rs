//! # Provider Client
//!
//! Retrying, caching client for one provider.
//!
//! The client turns the raw, flaky [`ProviderTransport`] into a reliable
//! request/response contract:
//!
//! - catalog and detail fetches retry with exponential backoff, then cache
//!   the outcome — positively on success, negatively (with a shorter TTL)
//!   on exhaustion, so a flapping provider is not hammered on every call
//! - health probes are issued exactly once with a hard 3 second timeout and
//!   always record wall-clock latency
//!
//! Expected failures surface as [`ApiResponse`] envelopes with
//! `success == false`; nothing here panics past the component boundary.
//!
//! # Examples
//!
//! ```ignore
//! use cinecompare::infrastructure::providers::client::ProviderClient;
//!
//! let client = ProviderClient::new(transport, cache);
//! let catalog = client.fetch_catalog().await;
//! assert!(catalog.success);
//! ```

use crate::domain::movie::{Catalog, MovieDetail};
use crate::domain::provider::ProviderId;
use crate::domain::response::ApiResponse;
use crate::domain::health::ProviderHealth;
use crate::infrastructure::cache::{Cache, SingleFlight};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::transport::ProviderTransport;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{info, warn};

/// Positive TTL for cached catalogs.
pub const CATALOG_TTL: Duration = Duration::from_secs(5 * 60);
/// Negative TTL for failed catalog fetches.
pub const CATALOG_NEGATIVE_TTL: Duration = Duration::from_secs(60);
/// Positive TTL for cached detail records.
pub const DETAIL_TTL: Duration = Duration::from_secs(10 * 60);
/// Negative TTL for failed detail fetches.
pub const DETAIL_NEGATIVE_TTL: Duration = Duration::from_secs(30);
/// Hard timeout for the unretried health probe.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Retry policy for catalog and detail fetches.
///
/// `max_retries` failed attempts are retried (so `max_retries + 1` attempts
/// total), with the backoff delay doubling after every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles after each failed attempt.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Sets the retry count.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the initial backoff delay.
    #[must_use]
    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Total attempts implied by this policy.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Retrying, caching client for one provider.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    provider: ProviderId,
    transport: Arc<dyn ProviderTransport>,
    cache: Arc<dyn Cache>,
    retry: RetryPolicy,
    single_flight: Option<Arc<SingleFlight>>,
}

impl ProviderClient {
    /// Creates a client with the default retry policy and no miss
    /// coalescing: two concurrent cold-cache calls may both hit the origin.
    #[must_use]
    pub fn new(transport: Arc<dyn ProviderTransport>, cache: Arc<dyn Cache>) -> Self {
        Self {
            provider: transport.provider().clone(),
            transport,
            cache,
            retry: RetryPolicy::default(),
            single_flight: None,
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enables single-flight coalescing: concurrent misses on the same
    /// cache key share one origin fetch.
    #[must_use]
    pub fn with_single_flight(mut self) -> Self {
        self.single_flight = Some(Arc::new(SingleFlight::new()));
        self
    }

    /// Returns the provider this client serves.
    #[must_use]
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Fetches the provider's catalog, serving from cache when possible.
    pub async fn fetch_catalog(&self) -> ApiResponse<Catalog> {
        let key = format!("catalog:{}", self.provider);
        if let Some(hit) = self.cached::<Catalog>(&key).await {
            info!(provider = %self.provider, "returning cached catalog");
            return hit;
        }

        let _flight = match &self.single_flight {
            Some(group) => {
                let guard = group.acquire(&key).await;
                // Another flight may have landed while we waited.
                if let Some(hit) = self.cached::<Catalog>(&key).await {
                    info!(provider = %self.provider, "returning cached catalog");
                    return hit;
                }
                Some(guard)
            }
            None => None,
        };

        let outcome = self
            .execute_with_retry("catalog", || async move {
                let raw = self.transport.fetch_catalog().await?;
                parse_json::<Catalog>(&raw)
            })
            .await;

        match outcome {
            Ok(catalog) => {
                let count = catalog.movies.len();
                info!(provider = %self.provider, count, "fetched catalog");
                let response = ApiResponse::ok(
                    catalog,
                    format!("Successfully retrieved {} movies from {}", count, self.provider),
                );
                self.store(&key, &response, CATALOG_TTL).await;
                response
            }
            Err(error) => {
                warn!(provider = %self.provider, error = %error, "catalog fetch failed");
                let response = ApiResponse::failure_with(
                    format!("Failed to retrieve movies from {}", self.provider),
                    vec![error.to_string()],
                );
                self.store(&key, &response, CATALOG_NEGATIVE_TTL).await;
                response
            }
        }
    }

    /// Fetches one detail record, serving from cache when possible.
    pub async fn fetch_detail(&self, native_id: &str) -> ApiResponse<MovieDetail> {
        let key = format!("detail:{}:{}", self.provider, native_id);
        if let Some(hit) = self.cached::<MovieDetail>(&key).await {
            info!(provider = %self.provider, native_id, "returning cached movie detail");
            return hit;
        }

        let _flight = match &self.single_flight {
            Some(group) => {
                let guard = group.acquire(&key).await;
                if let Some(hit) = self.cached::<MovieDetail>(&key).await {
                    info!(provider = %self.provider, native_id, "returning cached movie detail");
                    return hit;
                }
                Some(guard)
            }
            None => None,
        };

        let outcome = self
            .execute_with_retry("detail", || async move {
                let raw = self.transport.fetch_detail(native_id).await?;
                parse_json::<MovieDetail>(&raw)
            })
            .await;

        match outcome {
            Ok(mut detail) => {
                // Some providers omit their own name from the record.
                detail.provider.get_or_insert_with(|| self.provider.to_string());
                let response = ApiResponse::ok(
                    detail,
                    format!("Successfully retrieved movie details from {}", self.provider),
                );
                self.store(&key, &response, DETAIL_TTL).await;
                response
            }
            Err(error) => {
                warn!(provider = %self.provider, native_id, error = %error, "detail fetch failed");
                let response = ApiResponse::failure_with(
                    format!("Failed to retrieve movie details from {}", self.provider),
                    vec![error.to_string()],
                );
                self.store(&key, &response, DETAIL_NEGATIVE_TTL).await;
                response
            }
        }
    }

    /// Probes the provider once, with a hard timeout and no retries.
    ///
    /// Latency is recorded whatever the outcome. A non-success response maps
    /// to `error (<code>)`; a timeout or transport failure maps to `error`.
    pub async fn check_health(&self) -> ProviderHealth {
        let started = Instant::now();
        let outcome = timeout(HEALTH_PROBE_TIMEOUT, self.transport.probe()).await;
        let latency = started.elapsed();

        match outcome {
            Ok(Ok(code)) if (200..300).contains(&code) => {
                ProviderHealth::healthy(self.provider.clone(), latency)
            }
            Ok(Ok(code)) => ProviderHealth::error_status(self.provider.clone(), code, latency),
            Ok(Err(error)) => {
                warn!(provider = %self.provider, error = %error, "health probe failed");
                ProviderHealth::unreachable(self.provider.clone(), latency)
            }
            Err(_) => {
                warn!(provider = %self.provider, "health probe timed out");
                ProviderHealth::unreachable(self.provider.clone(), latency)
            }
        }
    }

    /// Runs `operation` under the retry policy.
    ///
    /// Every failure is retryable until attempts are exhausted; only the
    /// retrying call itself sleeps through the backoff.
    async fn execute_with_retry<T, F, Fut>(&self, what: &str, mut operation: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let total = self.retry.total_attempts();
        let mut delay = self.retry.initial_backoff;
        let mut last_error: Option<ProviderError> = None;

        for attempt in 1..=total {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt < total {
                        warn!(
                            provider = %self.provider,
                            what,
                            attempt,
                            error = %error,
                            backoff_ms = delay.as_millis() as u64,
                            "attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                    last_error = Some(error);
                }
            }
        }

        let message = last_error
            .map(|error| error.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        Err(ProviderError::retries_exhausted(total, message))
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<ApiResponse<T>> {
        let raw = self.cache.get(key).await?;
        serde_json::from_slice(&raw).ok()
    }

    async fn store<T: Serialize>(&self, key: &str, response: &ApiResponse<T>, ttl: Duration) {
        match serde_json::to_vec(response) {
            Ok(raw) => self.cache.set(key, Bytes::from(raw), ttl).await,
            Err(error) => warn!(key, error = %error, "failed to serialize cache entry"),
        }
    }
}

fn parse_json<T: DeserializeOwned>(raw: &Bytes) -> ProviderResult<T> {
    serde_json::from_slice(raw).map_err(|e| ProviderError::parse(e.to_string()))
}
