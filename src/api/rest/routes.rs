//! # Route Configuration
//!
//! Builds the axum router for the movie comparison API.

use crate::api::rest::handlers::{self, AppState};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Creates the application router with all routes and middleware.
///
/// The static `status`, `refresh` and `detail` segments take precedence
/// over the `{title}/{year}` capture, so the lookup route only sees real
/// title/year pairs.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/movies", get(handlers::get_all_comparisons))
        .route("/api/movies/status", get(handlers::get_provider_status))
        .route("/api/movies/refresh", post(handlers::refresh_comparisons))
        .route(
            "/api/movies/detail/{provider}/{id}",
            get(handlers::get_movie_detail),
        )
        .route("/api/movies/{title}/{year}", get(handlers::get_comparison))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::engine::{ComparisonEngine, EngineConfig};
    use crate::domain::provider::ProviderId;
    use crate::domain::response::ApiResponse;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::providers::client::{ProviderClient, RetryPolicy};
    use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
    use crate::infrastructure::providers::transport::ProviderTransport;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use bytes::Bytes;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct FixedTransport {
        provider: ProviderId,
        catalog: ProviderResult<Bytes>,
        detail: ProviderResult<Bytes>,
    }

    #[async_trait::async_trait]
    impl ProviderTransport for FixedTransport {
        fn provider(&self) -> &ProviderId {
            &self.provider
        }

        async fn fetch_catalog(&self) -> ProviderResult<Bytes> {
            self.catalog.clone()
        }

        async fn fetch_detail(&self, _native_id: &str) -> ProviderResult<Bytes> {
            self.detail.clone()
        }

        async fn probe(&self) -> ProviderResult<u16> {
            Ok(200)
        }
    }

    fn router() -> Router {
        let transport = std::sync::Arc::new(FixedTransport {
            provider: ProviderId::new("cinemaworld"),
            catalog: Ok(Bytes::from_static(
                br#"{"Movies":[{"ID":"cw0076759","Title":"A New Hope",
                    "Year":"1977","Type":"movie","Poster":""}]}"#,
            )),
            detail: Ok(Bytes::from_static(
                br#"{"ID":"cw0076759","Title":"A New Hope","Year":"1977",
                    "Type":"movie","Poster":"","Price":"29.5"}"#,
            )),
        });
        let cache = std::sync::Arc::new(InMemoryCache::new());
        let client = std::sync::Arc::new(
            ProviderClient::new(transport, cache.clone())
                .with_retry_policy(RetryPolicy::default().with_max_retries(0)),
        );
        let engine = ComparisonEngine::with_config(vec![client], cache, EngineConfig::default());
        create_router(Arc::new(AppState { engine }))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn movies_endpoint_returns_enveloped_list() {
        let (status, json) = get_json(router(), "/api/movies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["price"], "29.5");
    }

    #[tokio::test]
    async fn unknown_title_is_a_404() {
        let (status, json) = get_json(router(), "/api/movies/Nonexistent/1900").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);
        assert_eq!(
            json["message"],
            "Movie 'Nonexistent (1900)' not found in any provider"
        );
    }

    #[tokio::test]
    async fn status_endpoint_returns_bare_list() {
        let (status, json) = get_json(router(), "/api/movies/status").await;
        assert_eq!(status, StatusCode::OK);
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["status"], "healthy");
    }

    #[tokio::test]
    async fn detail_route_takes_precedence_over_title_capture() {
        let (status, json) = get_json(router(), "/api/movies/detail/cinemaworld/cw0076759").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["id"], "cw0076759");

        let (status, json) = get_json(router(), "/api/movies/detail/streamworld/x1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Unknown provider 'streamworld'");
    }

    #[tokio::test]
    async fn refresh_is_post_only() {
        let router = router();
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/movies/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let envelope: ApiResponse<serde_json::Value> = serde_json::from_value(json).unwrap();
        assert!(envelope.success);

        let wrong_method = router
            .oneshot(
                Request::builder()
                    .uri("/api/movies/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
