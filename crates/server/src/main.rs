//! PagePulse server entry point.
//!
//! Loads configuration from the environment (failing fast if the model API
//! key is absent), builds the router, and serves until terminated. Requests
//! are independent and stateless; the host's concurrency limit is the only
//! admission control.

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pagepulse_core::AppConfig;

mod app;

/// Outer bound on a whole request; comfortably above the sum of the two
/// stage timeouts so it only catches pathological cases.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "refusing to start");
            std::process::exit(1);
        }
    };

    let state = app::AppState { config: Arc::new(config) };
    let router = app::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive());

    let addr = std::env::var("PAGEPULSE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, %addr, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "pagepulse-server listening");

    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(%err, "server exited");
        std::process::exit(1);
    }
}
