//! # cinecompare
//!
//! Movie price comparison engine: aggregates several upstream movie
//! providers' catalogs, merges them by title and year, and finds the
//! cheapest offer for every title.
//!
//! ## Architecture
//!
//! The crate follows a layered design:
//!
//! - [`domain`] — provider, catalog, comparison and envelope types with the
//!   cheapest-selection rules
//! - [`infrastructure`] — the TTL byte cache and the retrying, caching
//!   provider clients over a swappable HTTP transport
//! - [`application`] — the [`ComparisonEngine`](application::ComparisonEngine)
//!   orchestrating merge, bounded detail fan-out and aggregate caching
//! - [`api`] — the axum REST surface
//! - [`config`] — layered file/environment settings, including the ordered
//!   provider list
//!
//! ## Degradation model
//!
//! Provider failures never abort an aggregation: a provider that is down
//! contributes explicitly unavailable offers, failed fetches are negatively
//! cached for a short window, and only the case where no provider yields a
//! catalog fails the whole pass.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
