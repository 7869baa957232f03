//! # Domain Model
//!
//! Core business types for cross-provider price comparison.
//!
//! ## Entities
//!
//! - [`MovieComparison`]: a title merged across providers with one
//!   [`ProviderOffer`] per configured provider
//! - [`BestOffer`]: cheapest-offer projection of a comparison
//!
//! ## Value objects
//!
//! - [`ProviderId`]: upstream provider identifier
//! - [`ComparisonKey`]: `(title, year)` merge key, case-insensitive on title
//! - [`MovieListing`] / [`MovieDetail`]: catalog and detail wire records
//! - [`ProviderHealth`]: health probe outcome
//! - [`ApiResponse`]: the `{data, success, message, errors}` envelope

pub mod comparison;
pub mod health;
pub mod movie;
pub mod provider;
pub mod response;

pub use comparison::{BestOffer, MovieComparison, ProviderOffer};
pub use health::ProviderHealth;
pub use movie::{Catalog, ComparisonKey, MovieDetail, MovieListing};
pub use provider::ProviderId;
pub use response::ApiResponse;
