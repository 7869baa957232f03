//! # REST Handlers
//!
//! Request handlers for the movie comparison endpoints.
//!
//! Every aggregate endpoint returns the standard envelope; lookups that miss
//! (`success == false` from the engine) answer 404, everything else answers
//! 200 and lets the envelope describe the outcome. Provider status is the
//! one bare-list response with no envelope.

use crate::application::engine::ComparisonEngine;
use crate::domain::comparison::{BestOffer, MovieComparison};
use crate::domain::health::ProviderHealth;
use crate::domain::movie::MovieDetail;
use crate::domain::response::ApiResponse;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

/// Shared state for all REST handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The comparison engine every endpoint delegates to.
    pub engine: ComparisonEngine,
}

/// `GET /api/movies` — the full cross-provider best-offer list.
pub async fn get_all_comparisons(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<Vec<BestOffer>>>) {
    let response = state.engine.get_all_comparisons().await;
    (StatusCode::OK, Json(response))
}

/// `GET /api/movies/{title}/{year}` — one full comparison.
pub async fn get_comparison(
    State(state): State<Arc<AppState>>,
    Path((title, year)): Path<(String, String)>,
) -> (StatusCode, Json<ApiResponse<MovieComparison>>) {
    let response = state.engine.get_comparison(&title, &year).await;
    let code = if response.success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (code, Json(response))
}

/// `GET /api/movies/detail/{provider}/{id}` — one provider's detail record.
pub async fn get_movie_detail(
    State(state): State<Arc<AppState>>,
    Path((provider, native_id)): Path<(String, String)>,
) -> (StatusCode, Json<ApiResponse<MovieDetail>>) {
    let response = state.engine.get_movie_detail(&provider, &native_id).await;
    let code = if response.success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (code, Json(response))
}

/// `GET /api/movies/status` — a bare list of per-provider probe results.
pub async fn get_provider_status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<Vec<ProviderHealth>>) {
    let statuses = state.engine.get_provider_status().await;
    (StatusCode::OK, Json(statuses))
}

/// `POST /api/movies/refresh` — drop every cache entry and re-aggregate.
pub async fn refresh_comparisons(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<Vec<BestOffer>>>) {
    let response = state.engine.refresh_all_comparisons().await;
    (StatusCode::OK, Json(response))
}
