//! # Response Envelope
//!
//! The `{data, success, message, errors}` envelope returned by every
//! aggregate operation (provider status is the one bare-list exception).
//!
//! Expected failures — provider outages, not-found lookups, retry
//! exhaustion — are envelopes with `success == false`, never panics or
//! errors crossing the component boundary.
//!
//! # Examples
//!
//! ```
//! use cinecompare::domain::response::ApiResponse;
//!
//! let ok = ApiResponse::ok(vec![1, 2, 3], "Successfully retrieved 3 items");
//! assert!(ok.success);
//!
//! let failed: ApiResponse<Vec<i32>> = ApiResponse::failure("No movies available from any provider");
//! assert!(!failed.success);
//! assert!(failed.data.is_none());
//! ```

use serde::{Deserialize, Serialize};

/// Generic response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Payload, present on success.
    pub data: Option<T>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome message.
    pub message: Option<String>,
    /// Error details accumulated on the way to a failure.
    #[serde(default = "Vec::new")]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// Creates a success envelope.
    #[must_use]
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            success: true,
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    /// Creates a failure envelope with no error details.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: false,
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    /// Creates a failure envelope carrying error details.
    #[must_use]
    pub fn failure_with(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            data: None,
            success: false,
            message: Some(message.into()),
            errors,
        }
    }
}
