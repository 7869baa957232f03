//! # Provider Identity
//!
//! Identifier for an upstream movie provider.
//!
//! Providers are independent back-end sources of catalog and pricing data
//! (e.g. `cinemaworld`, `filmworld`). The configured provider list is
//! injected at construction time; nothing in the engine assumes a fixed
//! provider count.
//!
//! # Examples
//!
//! ```
//! use cinecompare::domain::provider::ProviderId;
//!
//! let provider = ProviderId::new("cinemaworld");
//! assert_eq!(provider.as_str(), "cinemaworld");
//! assert_eq!(provider.to_string(), "cinemaworld");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for an upstream provider.
///
/// A thin newtype over the provider's path segment in the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a new provider ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
