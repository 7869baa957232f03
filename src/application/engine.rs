//! # Comparison Engine
//!
//! Cross-provider aggregation: catalog merge, bounded detail fan-out,
//! cheapest selection and aggregate caching.
//!
//! The engine owns no network code. It drives a configured, ordered list of
//! [`ProviderClient`]s, merges their catalogs on the case-insensitive
//! `(title, year)` key, populates one offer per provider for every merged
//! item under a global in-flight gate, and caches the finished aggregates:
//!
//! - `all_comparisons` — the full best-offer list, 3 minutes
//! - `comparison:{title}:{year}` — one full comparison, 5 minutes
//!
//! Provider failures degrade the result instead of aborting it: a provider
//! whose catalog fetch failed contributes `Provider unavailable` offers, and
//! only an empty merge fails the whole pass.
//!
//! # Examples
//!
//! ```ignore
//! use cinecompare::application::engine::ComparisonEngine;
//!
//! let engine = ComparisonEngine::new(clients, cache);
//! let all = engine.get_all_comparisons().await;
//! assert!(all.success);
//! ```

use crate::domain::comparison::{BestOffer, MovieComparison, ProviderOffer};
use crate::domain::health::ProviderHealth;
use crate::domain::movie::{Catalog, ComparisonKey, MovieDetail};
use crate::domain::provider::ProviderId;
use crate::domain::response::ApiResponse;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::providers::client::ProviderClient;
use bytes::Bytes;
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

const ALL_COMPARISONS_KEY: &str = "all_comparisons";

/// Tuning knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum merged items having their offers populated at once.
    pub max_in_flight_details: usize,
    /// TTL for the cached full best-offer list.
    pub all_comparisons_ttl: Duration,
    /// TTL for cached single comparisons.
    pub comparison_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_in_flight_details: 5,
            all_comparisons_ttl: Duration::from_secs(3 * 60),
            comparison_ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl EngineConfig {
    /// Sets the in-flight detail population bound.
    #[must_use]
    pub fn with_max_in_flight_details(mut self, max_in_flight_details: usize) -> Self {
        self.max_in_flight_details = max_in_flight_details;
        self
    }

    /// Sets the full-list cache TTL.
    #[must_use]
    pub fn with_all_comparisons_ttl(mut self, ttl: Duration) -> Self {
        self.all_comparisons_ttl = ttl;
        self
    }

    /// Sets the single-comparison cache TTL.
    #[must_use]
    pub fn with_comparison_ttl(mut self, ttl: Duration) -> Self {
        self.comparison_ttl = ttl;
        self
    }
}

/// Cross-provider price comparison engine.
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    providers: Vec<Arc<ProviderClient>>,
    cache: Arc<dyn Cache>,
    config: EngineConfig,
    gate: Arc<Semaphore>,
}

impl ComparisonEngine {
    /// Creates an engine over an ordered provider list with default tuning.
    #[must_use]
    pub fn new(providers: Vec<Arc<ProviderClient>>, cache: Arc<dyn Cache>) -> Self {
        Self::with_config(providers, cache, EngineConfig::default())
    }

    /// Creates an engine with explicit tuning.
    #[must_use]
    pub fn with_config(
        providers: Vec<Arc<ProviderClient>>,
        cache: Arc<dyn Cache>,
        config: EngineConfig,
    ) -> Self {
        let gate = Arc::new(Semaphore::new(config.max_in_flight_details));
        Self {
            providers,
            cache,
            config,
            gate,
        }
    }

    /// Merges every provider's catalog and returns one best-offer row per
    /// title, cached for 3 minutes.
    pub async fn get_all_comparisons(&self) -> ApiResponse<Vec<BestOffer>> {
        if let Some(hit) = self.cached::<Vec<BestOffer>>(ALL_COMPARISONS_KEY).await {
            info!("returning cached comparisons");
            return hit;
        }

        let catalogs = self.fetch_catalogs().await;
        let (available, merged) = merge_catalogs(&catalogs);

        if merged.is_empty() {
            warn!("no provider produced a usable catalog");
            return ApiResponse::failure("No movies available from any provider");
        }

        let available = &available;
        let comparisons = join_all(merged.into_values().map(|mut comparison| {
            let gate = Arc::clone(&self.gate);
            async move {
                // The semaphore is never closed, so acquisition cannot fail.
                let _permit = gate.acquire_owned().await.ok();
                self.populate_offers(&mut comparison, available).await;
                comparison
            }
        }))
        .await;

        let order = self.provider_order();
        let best: Vec<BestOffer> = comparisons
            .iter()
            .map(|comparison| BestOffer::project(comparison, &order))
            .collect();

        info!(
            movies = best.len(),
            providers = available.len(),
            "aggregation pass complete"
        );
        let response = ApiResponse::ok(
            best,
            format!(
                "Successfully compared {} movies across {} providers",
                comparisons.len(),
                available.len()
            ),
        );
        self.store(ALL_COMPARISONS_KEY, &response, self.config.all_comparisons_ttl)
            .await;
        response
    }

    /// Looks up one title/year across every provider and returns the full
    /// comparison, cached for 5 minutes.
    ///
    /// Title matching is case-insensitive; year must match exactly.
    pub async fn get_comparison(&self, title: &str, year: &str) -> ApiResponse<MovieComparison> {
        let key = format!("comparison:{title}:{year}");
        if let Some(hit) = self.cached::<MovieComparison>(&key).await {
            info!(title, year, "returning cached comparison");
            return hit;
        }

        let catalogs = self.fetch_catalogs().await;
        let wanted = ComparisonKey::new(title, year);
        let mut available = HashSet::new();
        let mut comparison = MovieComparison::new(title, year);

        for (client, response) in &catalogs {
            let provider = client.provider();
            let Some(catalog) = usable_catalog(response) else {
                continue;
            };
            available.insert(provider.clone());
            if let Some(listing) = catalog.movies.iter().find(|listing| wanted.matches(listing)) {
                if comparison.provider_movie_ids.is_empty() {
                    comparison.kind = listing.kind.clone();
                    comparison.poster = listing.poster.clone();
                }
                comparison
                    .provider_movie_ids
                    .insert(provider.clone(), listing.native_id.clone());
            }
        }

        if comparison.provider_movie_ids.is_empty() {
            return ApiResponse::failure(format!(
                "Movie '{title} ({year})' not found in any provider"
            ));
        }

        {
            let _permit = Arc::clone(&self.gate).acquire_owned().await.ok();
            self.populate_offers(&mut comparison, &available).await;
        }

        let response = ApiResponse::ok(comparison, "Successfully retrieved movie comparison");
        self.store(&key, &response, self.config.comparison_ttl).await;
        response
    }

    /// Fetches one provider's detail record, failing with an envelope when
    /// no configured provider matches.
    pub async fn get_movie_detail(&self, provider: &str, native_id: &str) -> ApiResponse<MovieDetail> {
        match self
            .providers
            .iter()
            .find(|client| client.provider().as_str() == provider)
        {
            Some(client) => client.fetch_detail(native_id).await,
            None => ApiResponse::failure(format!("Unknown provider '{provider}'")),
        }
    }

    /// Probes every provider concurrently. Never cached; each probe is
    /// independently bounded by the client's hard timeout.
    pub async fn get_provider_status(&self) -> Vec<ProviderHealth> {
        join_all(self.providers.iter().map(|client| client.check_health())).await
    }

    /// Drops every cached entry, then runs a fresh aggregation pass.
    pub async fn refresh_all_comparisons(&self) -> ApiResponse<Vec<BestOffer>> {
        info!("clearing cache for refresh");
        self.cache.invalidate_all().await;
        self.get_all_comparisons().await
    }

    async fn fetch_catalogs(&self) -> Vec<(Arc<ProviderClient>, ApiResponse<Catalog>)> {
        join_all(self.providers.iter().map(|client| {
            let client = Arc::clone(client);
            async move {
                let response = client.fetch_catalog().await;
                (client, response)
            }
        }))
        .await
    }

    /// Builds one offer per configured provider, concurrently, and resolves
    /// the cheapest.
    async fn populate_offers(
        &self,
        comparison: &mut MovieComparison,
        available: &HashSet<ProviderId>,
    ) {
        let offers = join_all(self.providers.iter().map(|client| {
            let provider = client.provider().clone();
            let native_id = comparison.provider_movie_ids.get(&provider).cloned();
            async move {
                if !available.contains(&provider) {
                    return ProviderOffer::failed(provider, "Provider unavailable");
                }
                let Some(native_id) = native_id else {
                    return ProviderOffer::failed(provider, "Movie not available on this provider");
                };
                let response = client.fetch_detail(&native_id).await;
                match response.data.filter(|_| response.success) {
                    Some(detail) => {
                        let mut offer = ProviderOffer::priced(provider, detail.price, native_id);
                        offer.kind = detail.kind;
                        offer.poster = detail.poster;
                        offer
                    }
                    None => ProviderOffer::failed(
                        provider,
                        response
                            .message
                            .unwrap_or_else(|| "detail fetch failed".to_string()),
                    ),
                }
            }
        }))
        .await;

        comparison.offers = offers;
        comparison.resolve_cheapest();
    }

    fn provider_order(&self) -> Vec<ProviderId> {
        self.providers
            .iter()
            .map(|client| client.provider().clone())
            .collect()
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

fn usable_catalog(response: &ApiResponse<Catalog>) -> Option<&Catalog> {
    response.data.as_ref().filter(|_| response.success)
}

/// Merges successful catalogs on `(title, year)`. Returns the set of
/// providers whose catalog fetch succeeded and the merged map; insertion
/// order never affects the final state.
fn merge_catalogs(
    catalogs: &[(Arc<ProviderClient>, ApiResponse<Catalog>)],
) -> (HashSet<ProviderId>, BTreeMap<ComparisonKey, MovieComparison>) {
    let mut available = HashSet::new();
    let mut merged: BTreeMap<ComparisonKey, MovieComparison> = BTreeMap::new();

    for (client, response) in catalogs {
        let provider = client.provider();
        let Some(catalog) = usable_catalog(response) else {
            warn!(provider = %provider, "excluding provider from merge");
            continue;
        };
        available.insert(provider.clone());
        for listing in &catalog.movies {
            let key = ComparisonKey::new(&listing.title, &listing.year);
            merged
                .entry(key)
                .or_insert_with(|| MovieComparison::from_listing(listing))
                .provider_movie_ids
                .insert(provider.clone(), listing.native_id.clone());
        }
    }

    (available, merged)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::providers::client::RetryPolicy;
    use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
    use crate::infrastructure::providers::transport::ProviderTransport;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport serving a fixed catalog and detail map, counting calls and
    /// tracking peak detail concurrency.
    #[derive(Debug)]
    struct CannedTransport {
        provider: ProviderId,
        catalog: ProviderResult<Bytes>,
        details: HashMap<String, Bytes>,
        catalog_calls: AtomicUsize,
        detail_calls: AtomicUsize,
        detail_running: Arc<AtomicUsize>,
        detail_peak: Arc<AtomicUsize>,
    }

    impl CannedTransport {
        fn new(provider: &str, catalog: ProviderResult<Bytes>) -> Self {
            Self {
                provider: ProviderId::new(provider),
                catalog,
                details: HashMap::new(),
                catalog_calls: AtomicUsize::new(0),
                detail_calls: AtomicUsize::new(0),
                detail_running: Arc::new(AtomicUsize::new(0)),
                detail_peak: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn with_detail(mut self, native_id: &str, title: &str, year: &str, price: &str) -> Self {
            let body = format!(
                r#"{{"ID":"{native_id}","Title":"{title}","Year":"{year}",
                    "Type":"movie","Poster":"https://example.com/{native_id}.jpg",
                    "Price":"{price}"}}"#
            );
            self.details.insert(native_id.to_string(), Bytes::from(body));
            self
        }
    }

    #[async_trait::async_trait]
    impl ProviderTransport for CannedTransport {
        fn provider(&self) -> &ProviderId {
            &self.provider
        }

        async fn fetch_catalog(&self) -> ProviderResult<Bytes> {
            self.catalog_calls.fetch_add(1, Ordering::SeqCst);
            self.catalog.clone()
        }

        async fn fetch_detail(&self, native_id: &str) -> ProviderResult<Bytes> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.detail_running.fetch_add(1, Ordering::SeqCst) + 1;
            self.detail_peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.detail_running.fetch_sub(1, Ordering::SeqCst);
            self.details
                .get(native_id)
                .cloned()
                .ok_or_else(|| ProviderError::status(404, "no such movie"))
        }

        async fn probe(&self) -> ProviderResult<u16> {
            match &self.catalog {
                Ok(_) => Ok(200),
                Err(ProviderError::Status { code, .. }) => Ok(*code),
                Err(error) => Err(error.clone()),
            }
        }
    }

    fn catalog_body(entries: &[(&str, &str, &str)]) -> ProviderResult<Bytes> {
        let movies: Vec<String> = entries
            .iter()
            .map(|(id, title, year)| {
                format!(
                    r#"{{"ID":"{id}","Title":"{title}","Year":"{year}",
                        "Type":"movie","Poster":"https://example.com/{id}.jpg"}}"#
                )
            })
            .collect();
        Ok(Bytes::from(format!(r#"{{"Movies":[{}]}}"#, movies.join(","))))
    }

    fn down() -> ProviderResult<Bytes> {
        Err(ProviderError::status(503, "down"))
    }

    fn engine_over(transports: Vec<CannedTransport>, config: EngineConfig) -> (ComparisonEngine, Vec<Arc<CannedTransport>>) {
        let cache: Arc<InMemoryCache> = Arc::new(InMemoryCache::new());
        let transports: Vec<Arc<CannedTransport>> = transports.into_iter().map(Arc::new).collect();
        let clients = transports
            .iter()
            .map(|transport| {
                // One attempt per fetch keeps failure-path tests direct;
                // retry behavior has its own coverage.
                Arc::new(
                    ProviderClient::new(transport.clone(), cache.clone())
                        .with_retry_policy(RetryPolicy::default().with_max_retries(0)),
                )
            })
            .collect();
        (ComparisonEngine::with_config(clients, cache, config), transports)
    }

    fn two_provider_engine() -> (ComparisonEngine, Vec<Arc<CannedTransport>>) {
        let cinemaworld = CannedTransport::new(
            "cinemaworld",
            catalog_body(&[
                ("cw0121766", "Star Wars: Episode III - Revenge of the Sith", "2005"),
                ("cw0076759", "Star Wars: Episode IV - A New Hope", "1977"),
            ]),
        )
        .with_detail("cw0121766", "Star Wars: Episode III - Revenge of the Sith", "2005", "1249.5")
        .with_detail("cw0076759", "Star Wars: Episode IV - A New Hope", "1977", "29.5");

        let filmworld = CannedTransport::new(
            "filmworld",
            catalog_body(&[(
                "fw0121766",
                "star wars: episode iii - revenge of the sith",
                "2005",
            )]),
        )
        .with_detail(
            "fw0121766",
            "star wars: episode iii - revenge of the sith",
            "2005",
            "1259.5",
        );

        engine_over(vec![cinemaworld, filmworld], EngineConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn all_providers_down_fails_whole_pass() {
        let (engine, _) = engine_over(
            vec![
                CannedTransport::new("cinemaworld", down()),
                CannedTransport::new("filmworld", down()),
            ],
            EngineConfig::default(),
        );

        let response = engine.get_all_comparisons().await;
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("No movies available from any provider")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn one_provider_down_degrades_instead_of_failing() {
        let cinemaworld = CannedTransport::new(
            "cinemaworld",
            catalog_body(&[("cw0076759", "A New Hope", "1977")]),
        )
        .with_detail("cw0076759", "A New Hope", "1977", "29.5");
        let (engine, _) = engine_over(
            vec![cinemaworld, CannedTransport::new("filmworld", down())],
            EngineConfig::default(),
        );

        let all = engine.get_all_comparisons().await;
        assert!(all.success);
        assert_eq!(all.data.as_ref().unwrap().len(), 1);
        assert_eq!(
            all.message.as_deref(),
            Some("Successfully compared 1 movies across 1 providers")
        );

        // The failed provider still shows up in the single-item view, as an
        // explicitly unavailable offer.
        let one = engine.get_comparison("A New Hope", "1977").await;
        let comparison = one.data.unwrap();
        let filmworld = comparison
            .offers
            .iter()
            .find(|offer| offer.provider == ProviderId::new("filmworld"))
            .unwrap();
        assert!(!filmworld.available);
        assert_eq!(filmworld.error.as_deref(), Some("Provider unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn cheapest_provider_wins_across_catalogs() {
        let (engine, _) = two_provider_engine();

        let response = engine
            .get_comparison("Star Wars: Episode III - Revenge of the Sith", "2005")
            .await;
        assert!(response.success);
        let comparison = response.data.unwrap();
        assert_eq!(comparison.cheapest_price, Some("1249.5".parse().unwrap()));
        assert_eq!(comparison.cheapest_provider, Some(ProviderId::new("cinemaworld")));
        assert_eq!(comparison.offers.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_is_case_insensitive_on_title() {
        let (engine, _) = two_provider_engine();

        let all = engine.get_all_comparisons().await;
        // Two cinemaworld titles, one of which filmworld also carries under
        // different casing: 2 merged rows, not 3.
        assert_eq!(all.data.as_ref().unwrap().len(), 2);
        assert_eq!(
            all.message.as_deref(),
            Some("Successfully compared 2 movies across 2 providers")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn aggregate_results_are_cached() {
        let (engine, transports) = two_provider_engine();

        let first = engine.get_all_comparisons().await;
        let catalog_calls: usize = transports
            .iter()
            .map(|t| t.catalog_calls.load(Ordering::SeqCst))
            .sum();
        let detail_calls: usize = transports
            .iter()
            .map(|t| t.detail_calls.load(Ordering::SeqCst))
            .sum();

        let second = engine.get_all_comparisons().await;
        assert_eq!(second, first);
        let catalog_after: usize = transports
            .iter()
            .map(|t| t.catalog_calls.load(Ordering::SeqCst))
            .sum();
        let detail_after: usize = transports
            .iter()
            .map(|t| t.detail_calls.load(Ordering::SeqCst))
            .sum();
        assert_eq!(catalog_after, catalog_calls, "cached call must not refetch catalogs");
        assert_eq!(detail_after, detail_calls, "cached call must not refetch details");
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_clears_cache_and_refetches() {
        let (engine, transports) = two_provider_engine();

        let first = engine.get_all_comparisons().await;
        let before = transports[0].catalog_calls.load(Ordering::SeqCst);

        let refreshed = engine.refresh_all_comparisons().await;
        assert!(refreshed.success);
        assert_eq!(refreshed.data, first.data);
        assert!(
            transports[0].catalog_calls.load(Ordering::SeqCst) > before,
            "refresh must bypass every cache layer"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_title_reports_not_found() {
        let (engine, _) = two_provider_engine();

        let response = engine.get_comparison("Nonexistent", "1900").await;
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Movie 'Nonexistent (1900)' not found in any provider")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unlisted_provider_offer_is_marked_unavailable() {
        let (engine, _) = two_provider_engine();

        // Only cinemaworld lists A New Hope.
        let response = engine
            .get_comparison("Star Wars: Episode IV - A New Hope", "1977")
            .await;
        let comparison = response.data.unwrap();
        let filmworld = comparison
            .offers
            .iter()
            .find(|offer| offer.provider == ProviderId::new("filmworld"))
            .unwrap();
        assert!(!filmworld.available);
        assert_eq!(
            filmworld.error.as_deref(),
            Some("Movie not available on this provider")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn detail_lookup_routes_to_matching_provider() {
        let (engine, _) = two_provider_engine();

        let response = engine.get_movie_detail("cinemaworld", "cw0076759").await;
        assert!(response.success);
        assert_eq!(response.data.unwrap().price, "29.5".parse().unwrap());

        let unknown = engine.get_movie_detail("streamworld", "x1").await;
        assert!(!unknown.success);
        assert_eq!(unknown.message.as_deref(), Some("Unknown provider 'streamworld'"));
    }

    #[tokio::test(start_paused = true)]
    async fn provider_status_reflects_each_provider() {
        let cinemaworld =
            CannedTransport::new("cinemaworld", catalog_body(&[("cw1", "A", "2000")]));
        let filmworld = CannedTransport::new("filmworld", down());
        let (engine, _) = engine_over(vec![cinemaworld, filmworld], EngineConfig::default());

        let statuses = engine.get_provider_status().await;
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].is_healthy);
        assert!(!statuses[1].is_healthy);
        assert_eq!(statuses[1].status, "error (503)");
    }

    #[tokio::test(start_paused = true)]
    async fn detail_fan_out_respects_the_gate() {
        let entries: Vec<(String, String, String)> = (0..12)
            .map(|i| (format!("cw{i}"), format!("Movie {i}"), "2010".to_string()))
            .collect();
        let borrowed: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(id, title, year)| (id.as_str(), title.as_str(), year.as_str()))
            .collect();

        let mut transport = CannedTransport::new("cinemaworld", catalog_body(&borrowed));
        for (id, title, year) in &borrowed {
            transport = transport.with_detail(id, title, year, "10.0");
        }

        let gate = 2;
        let (engine, transports) = engine_over(
            vec![transport],
            EngineConfig::default().with_max_in_flight_details(gate),
        );

        let response = engine.get_all_comparisons().await;
        assert!(response.success);
        assert_eq!(transports[0].detail_calls.load(Ordering::SeqCst), 12);
        assert!(
            transports[0].detail_peak.load(Ordering::SeqCst) <= gate,
            "peak detail concurrency {} exceeded gate {gate}",
            transports[0].detail_peak.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn config_defaults_match_documented_ttls() {
        let config = EngineConfig::default();
        assert_eq!(config.max_in_flight_details, 5);
        assert_eq!(config.all_comparisons_ttl, Duration::from_secs(180));
        assert_eq!(config.comparison_ttl, Duration::from_secs(300));
    }
}
