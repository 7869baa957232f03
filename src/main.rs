//! Service entrypoint: wires configuration, cache, provider clients and the
//! comparison engine into the axum server.

use anyhow::Context;
use cinecompare::api::rest::{AppState, create_router};
use cinecompare::application::engine::{ComparisonEngine, EngineConfig};
use cinecompare::config::Settings;
use cinecompare::domain::provider::ProviderId;
use cinecompare::infrastructure::cache::{Cache, InMemoryCache};
use cinecompare::infrastructure::providers::client::ProviderClient;
use cinecompare::infrastructure::providers::http::HttpTransport;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().context("failed to load configuration")?;
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());

    let mut clients = Vec::with_capacity(settings.providers.len());
    for name in &settings.providers {
        let transport = HttpTransport::new(
            ProviderId::new(name),
            &settings.upstream.base_url,
            &settings.upstream.access_token,
            settings.upstream.timeout(),
        )
        .with_context(|| format!("failed to build transport for provider '{name}'"))?;
        let mut client = ProviderClient::new(Arc::new(transport), Arc::clone(&cache));
        if settings.engine.single_flight {
            client = client.with_single_flight();
        }
        clients.push(Arc::new(client));
    }

    let engine = ComparisonEngine::with_config(
        clients,
        cache,
        EngineConfig::default().with_max_in_flight_details(settings.engine.max_in_flight_details),
    );
    let router = create_router(Arc::new(AppState { engine }));

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, providers = settings.providers.len(), "listening");
    axum::serve(listener, router)
        .await
        .context("server error")?;
    Ok(())
}
