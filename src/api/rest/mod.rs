//! # REST API
//!
//! REST endpoints using axum for the movie comparison service.
//!
//! # Endpoints
//!
//! ## Movies
//! - `GET /api/movies` - Full cross-provider best-offer list
//! - `GET /api/movies/{title}/{year}` - One full comparison by title/year
//! - `GET /api/movies/detail/{provider}/{id}` - One provider's detail record
//!
//! ## Operations
//! - `GET /api/movies/status` - Per-provider health probes (bare list)
//! - `POST /api/movies/refresh` - Clear every cache entry and re-aggregate
//!
//! # Usage
//!
//! ```ignore
//! use cinecompare::api::rest::{AppState, create_router};
//! use std::sync::Arc;
//!
//! let router = create_router(Arc::new(AppState { engine }));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
