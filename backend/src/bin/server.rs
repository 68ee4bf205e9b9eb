//! Stars forecast HTTP server binary.
//!
//! Loads configuration, wires the upstream client and result cache into the
//! forecast service, and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! STARS_API_URL=http://stars-provider:8080 \
//!   cargo run --bin stars-forecast-server
//!
//! # With a config file
//! STARS_FORECAST_CONFIG=stars-forecast.toml cargo run --bin stars-forecast-server
//! ```
//!
//! # Environment Variables
//!
//! - `STARS_FORECAST_CONFIG`: optional TOML config file
//! - `HOST`, `PORT`: bind address (default: 0.0.0.0:8080)
//! - `STARS_API_URL`, `FETCH_TIMEOUT_SECS`: star-history provider
//! - `CACHE_TTL_SECS`, `CACHE_CAPACITY`: result cache limits
//! - `FORECAST_BACKEND`: pipeline behind `/predict`
//! - `CORS_POLICY`: `permissive` or `disabled`
//! - `RUST_LOG`: log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use stars_forecast::config::ServiceConfig;
use stars_forecast::http::{create_router, AppState};
use stars_forecast::services::{ForecastCache, ForecastService};
use stars_forecast::upstream::StarHistoryClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting stars forecast server");

    let config = ServiceConfig::load().context("invalid configuration")?;
    info!(
        "Upstream {} (timeout {}s), cache ttl {}s / {} entries, /predict uses {}",
        config.upstream.base_url,
        config.upstream.timeout_secs,
        config.cache.ttl_secs,
        config.cache.capacity,
        config.forecast.default_backend
    );

    let client = StarHistoryClient::new(&config.upstream.base_url, config.upstream.timeout())
        .context("failed to build upstream client")?;
    let cache = Arc::new(ForecastCache::new(config.cache.ttl(), config.cache.capacity));
    let service = Arc::new(ForecastService::new(Arc::new(client), cache));

    let state = AppState::new(service, config.forecast.default_backend);
    let app = create_router(state, config.http.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
