//! # Provider Errors
//!
//! Error taxonomy for provider fetches.
//!
//! Any failure while fetching a catalog or detail record — non-success
//! status, transport failure, unparseable body — is transient and retryable
//! until the retry policy is exhausted, at which point it becomes the
//! terminal [`ProviderError::RetriesExhausted`].
//!
//! # Examples
//!
//! ```
//! use cinecompare::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::status(503, "Service Unavailable");
//! assert!(error.is_retryable());
//!
//! let error = ProviderError::retries_exhausted(4, "status 503");
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Error type for provider transport and client operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Non-success HTTP response.
    #[error("provider returned status {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Error message or response snippet.
        message: String,
    },

    /// Response body could not be parsed.
    #[error("provider response parse error: {message}")]
    Parse {
        /// Error message.
        message: String,
    },

    /// Retry policy exhausted; wraps the last transient failure.
    #[error("provider request failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Total attempts made (retries + 1).
        attempts: u32,
        /// Message of the last failure.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a non-success status error.
    #[must_use]
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a terminal retry-exhaustion error.
    #[must_use]
    pub fn retries_exhausted(attempts: u32, message: impl Into<String>) -> Self {
        Self::RetriesExhausted {
            attempts,
            message: message.into(),
        }
    }

    /// Returns true if another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::RetriesExhausted { .. })
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ProviderError::timeout("t").is_retryable());
        assert!(ProviderError::connection("c").is_retryable());
        assert!(ProviderError::status(500, "boom").is_retryable());
        assert!(ProviderError::parse("bad json").is_retryable());
    }

    #[test]
    fn exhaustion_is_terminal() {
        let error = ProviderError::retries_exhausted(4, "status 503");
        assert!(!error.is_retryable());
        assert_eq!(
            error.to_string(),
            "provider request failed after 4 attempts: status 503"
        );
    }

    #[test]
    fn status_display_includes_code() {
        let error = ProviderError::status(404, "Not Found");
        assert!(error.to_string().contains("404"));
    }
}
