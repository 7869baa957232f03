//! # Movie Catalog Types
//!
//! Wire-level catalog and detail records fetched from providers.
//!
//! Upstream JSON uses PascalCase field names (`ID`, `Title`, `Year`, `Type`,
//! `Poster`, `Price`) and encodes prices as decimal strings. Our own API
//! serializes camelCase; deserialization accepts both spellings via serde
//! aliases so the same types cover the wire boundary and the cache payloads.
//!
//! # Examples
//!
//! ```
//! use cinecompare::domain::movie::MovieListing;
//!
//! let listing: MovieListing = serde_json::from_str(
//!     r#"{"ID":"cw0121766","Title":"Star Wars: Episode III - Revenge of the Sith",
//!         "Year":"2005","Type":"movie","Poster":"https://example.com/p.jpg"}"#,
//! ).unwrap();
//! assert_eq!(listing.native_id, "cw0121766");
//! assert_eq!(listing.kind, "movie");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One catalog entry as listed by a single provider.
///
/// Identity within a provider is `native_id`; identity across providers is
/// the `(title, year)` merge key (see [`ComparisonKey`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieListing {
    /// Provider-native identifier.
    #[serde(rename = "id", alias = "ID")]
    pub native_id: String,
    /// Movie title.
    #[serde(alias = "Title")]
    pub title: String,
    /// Release year, kept as a string to match the upstream format.
    #[serde(alias = "Year")]
    pub year: String,
    /// Kind of inventory ("movie" for every known provider).
    #[serde(rename = "type", alias = "Type")]
    pub kind: String,
    /// Poster image URL.
    #[serde(alias = "Poster", default)]
    pub poster: String,
}

/// A provider's full catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// All listings carried by the provider.
    #[serde(alias = "Movies", default)]
    pub movies: Vec<MovieListing>,
}

/// Detail record for one `(provider, native_id)` pair.
///
/// The upstream detail endpoint returns many more fields (rating, plot,
/// cast); only the ones the comparison needs are kept, the rest are ignored
/// during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    /// Provider-native identifier.
    #[serde(rename = "id", alias = "ID")]
    pub native_id: String,
    /// Movie title.
    #[serde(alias = "Title")]
    pub title: String,
    /// Release year.
    #[serde(alias = "Year")]
    pub year: String,
    /// Kind of inventory.
    #[serde(rename = "type", alias = "Type")]
    pub kind: String,
    /// Poster image URL.
    #[serde(alias = "Poster", default)]
    pub poster: String,
    /// Offered price. Upstream sends this as a JSON string like `"1249.5"`.
    #[serde(alias = "Price")]
    pub price: Decimal,
    /// Provider that produced this record; absent on the wire for some
    /// providers, filled in by the fetching client.
    #[serde(alias = "Provider", default)]
    pub provider: Option<String>,
}

/// Cross-provider merge key: `(title, year)`, case-insensitive on title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComparisonKey {
    title: String,
    year: String,
}

impl ComparisonKey {
    /// Builds the merge key for a title/year pair.
    #[must_use]
    pub fn new(title: &str, year: &str) -> Self {
        Self {
            title: title.to_lowercase(),
            year: year.to_string(),
        }
    }

    /// Returns true if the given listing matches this key.
    #[must_use]
    pub fn matches(&self, listing: &MovieListing) -> bool {
        listing.title.to_lowercase() == self.title && listing.year == self.year
    }
}
