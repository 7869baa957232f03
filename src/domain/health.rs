//! # Provider Health
//!
//! Outcome of a single, unretried provider health probe.
//!
//! # Examples
//!
//! ```
//! use cinecompare::domain::health::ProviderHealth;
//! use cinecompare::domain::provider::ProviderId;
//! use std::time::Duration;
//!
//! let health = ProviderHealth::healthy(ProviderId::new("cinemaworld"), Duration::from_millis(42));
//! assert!(health.is_healthy);
//! assert_eq!(health.status, "healthy");
//! ```

use crate::domain::provider::ProviderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one health probe against a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHealth {
    /// The probed provider.
    pub provider: ProviderId,
    /// Whether the probe got a success response.
    pub is_healthy: bool,
    /// Status label: `healthy`, `error (<code>)` or `error`.
    pub status: String,
    /// Wall-clock probe latency in milliseconds, recorded on every outcome.
    pub response_time_ms: u64,
    /// When the probe was performed.
    pub last_checked: DateTime<Utc>,
}

impl ProviderHealth {
    /// Creates a healthy status.
    #[must_use]
    pub fn healthy(provider: ProviderId, latency: Duration) -> Self {
        Self::with_status(provider, true, "healthy", latency)
    }

    /// Creates an unhealthy status for a non-success HTTP response.
    #[must_use]
    pub fn error_status(provider: ProviderId, code: u16, latency: Duration) -> Self {
        Self::with_status(provider, false, format!("error ({code})"), latency)
    }

    /// Creates an unhealthy status for a timeout or transport failure.
    #[must_use]
    pub fn unreachable(provider: ProviderId, latency: Duration) -> Self {
        Self::with_status(provider, false, "error", latency)
    }

    fn with_status(
        provider: ProviderId,
        is_healthy: bool,
        status: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            provider,
            is_healthy,
            status: status.into(),
            response_time_ms: latency.as_millis() as u64,
            last_checked: Utc::now(),
        }
    }
}
