//! # Comparison Entities
//!
//! Merged cross-provider items, per-provider offers and cheapest selection.
//!
//! A [`MovieComparison`] is built fresh on every aggregation pass by merging
//! provider catalogs on the `(title, year)` key. It always carries exactly
//! one [`ProviderOffer`] per configured provider, whether or not that
//! provider lists the title. Cheapest selection marks **every** offer at the
//! minimum price, so ties propagate rather than electing a single winner.
//!
//! # Examples
//!
//! ```
//! use cinecompare::domain::comparison::{MovieComparison, ProviderOffer};
//! use cinecompare::domain::provider::ProviderId;
//!
//! let mut comparison = MovieComparison::new("A New Hope", "1977");
//! comparison.offers = vec![
//!     ProviderOffer::priced(ProviderId::new("a"), "29.5".parse().unwrap(), "cw1"),
//!     ProviderOffer::priced(ProviderId::new("b"), "19.5".parse().unwrap(), "fw1"),
//! ];
//! comparison.resolve_cheapest();
//! assert_eq!(comparison.cheapest_provider, Some(ProviderId::new("b")));
//! ```

use crate::domain::movie::MovieListing;
use crate::domain::provider::ProviderId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One provider's pricing and availability statement for a merged item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOffer {
    /// The provider this offer belongs to.
    pub provider: ProviderId,
    /// Offered price, if the provider carries the title and the detail
    /// fetch succeeded.
    pub price: Option<Decimal>,
    /// Whether the title can currently be bought from this provider.
    pub available: bool,
    /// Failure reason when `available` is false.
    pub error: Option<String>,
    /// True for every offer whose price equals the item's minimum.
    pub is_cheapest: bool,
    /// When this offer was computed.
    pub last_checked: DateTime<Utc>,
    /// Provider-native identifier; empty when the provider has no listing.
    pub native_id: String,
    /// Kind of inventory reported by the detail record.
    pub kind: String,
    /// Poster URL reported by the detail record.
    pub poster: String,
}

impl ProviderOffer {
    /// Creates an offer that is not (yet) available, with no error recorded.
    #[must_use]
    pub fn unavailable(provider: ProviderId) -> Self {
        Self {
            provider,
            price: None,
            available: false,
            error: None,
            is_cheapest: false,
            last_checked: Utc::now(),
            native_id: String::new(),
            kind: String::new(),
            poster: String::new(),
        }
    }

    /// Creates an unavailable offer carrying a failure reason.
    #[must_use]
    pub fn failed(provider: ProviderId, error: impl Into<String>) -> Self {
        let mut offer = Self::unavailable(provider);
        offer.error = Some(error.into());
        offer
    }

    /// Creates an available, priced offer.
    #[must_use]
    pub fn priced(provider: ProviderId, price: Decimal, native_id: impl Into<String>) -> Self {
        let mut offer = Self::unavailable(provider);
        offer.available = true;
        offer.price = Some(price);
        offer.native_id = native_id.into();
        offer
    }
}

/// A title merged across providers, with one offer per configured provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieComparison {
    /// Movie title as first seen (or as requested for single lookups).
    pub title: String,
    /// Release year.
    pub year: String,
    /// Kind of inventory, copied from the cheapest offer once resolved.
    pub kind: String,
    /// Poster URL, copied from the cheapest offer once resolved.
    pub poster: String,
    /// Provider-native IDs, only for providers whose catalog listed this key.
    pub provider_movie_ids: HashMap<ProviderId, String>,
    /// One offer per configured provider, in configured order.
    pub offers: Vec<ProviderOffer>,
    /// Minimum price among available offers.
    pub cheapest_price: Option<Decimal>,
    /// Provider of one minimal-price offer; `None` iff no offer is available.
    pub cheapest_provider: Option<ProviderId>,
    /// When this comparison was assembled.
    pub last_updated: DateTime<Utc>,
}

impl MovieComparison {
    /// Creates an empty comparison for a title/year pair.
    #[must_use]
    pub fn new(title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            kind: String::new(),
            poster: String::new(),
            provider_movie_ids: HashMap::new(),
            offers: Vec::new(),
            cheapest_price: None,
            cheapest_provider: None,
            last_updated: Utc::now(),
        }
    }

    /// Seeds a comparison from the first catalog listing seen for its key.
    #[must_use]
    pub fn from_listing(listing: &MovieListing) -> Self {
        let mut comparison = Self::new(listing.title.clone(), listing.year.clone());
        comparison.kind = listing.kind.clone();
        comparison.poster = listing.poster.clone();
        comparison
    }

    /// Resolves the cheapest offer(s).
    ///
    /// Among offers with `available == true`, finds the minimum price, copies
    /// the summary fields from the first such offer in offer order (the
    /// tie-break for kind/poster is deliberately unspecified) and flags
    /// `is_cheapest` on every offer at the minimum.
    pub fn resolve_cheapest(&mut self) {
        let min = self
            .offers
            .iter()
            .filter(|offer| offer.available)
            .filter_map(|offer| offer.price)
            .min();

        let Some(min) = min else {
            self.cheapest_price = None;
            self.cheapest_provider = None;
            return;
        };

        if let Some(best) = self
            .offers
            .iter()
            .find(|offer| offer.available && offer.price == Some(min))
        {
            self.cheapest_price = Some(min);
            self.cheapest_provider = Some(best.provider.clone());
            self.kind = best.kind.clone();
            self.poster = best.poster.clone();
        }

        for offer in &mut self.offers {
            if offer.price == Some(min) {
                offer.is_cheapest = true;
            }
        }
    }
}

/// Best-offer projection of a [`MovieComparison`].
///
/// This is the summary record returned by the full-catalog aggregation:
/// one row per merged title, carrying the cheapest provider's identifiers
/// and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOffer {
    /// Native ID of the cheapest provider's listing, falling back to the
    /// first provider (in configured order) that listed the title.
    pub native_id: Option<String>,
    /// Movie title.
    pub title: String,
    /// Release year.
    pub year: String,
    /// Kind of inventory.
    #[serde(rename = "type")]
    pub kind: String,
    /// Cheapest provider, if any offer was available.
    pub provider: Option<ProviderId>,
    /// Poster URL.
    pub poster: String,
    /// Cheapest price, if any offer was available.
    pub price: Option<Decimal>,
}

impl BestOffer {
    /// Projects a completed comparison to its best-offer summary.
    ///
    /// `provider_order` supplies the configured provider order used for the
    /// native-ID fallback when no offer was available.
    #[must_use]
    pub fn project(comparison: &MovieComparison, provider_order: &[ProviderId]) -> Self {
        let native_id = comparison
            .cheapest_provider
            .as_ref()
            .and_then(|provider| comparison.provider_movie_ids.get(provider))
            .or_else(|| {
                provider_order
                    .iter()
                    .find_map(|provider| comparison.provider_movie_ids.get(provider))
            })
            .cloned();

        Self {
            native_id,
            title: comparison.title.clone(),
            year: comparison.year.clone(),
            kind: comparison.kind.clone(),
            provider: comparison.cheapest_provider.clone(),
            poster: comparison.poster.clone(),
            price: comparison.cheapest_price,
        }
    }
}
