//! Switchyard Server - Evaluation sidecar for feature flags.
//!
//! Serves the switchyard-engine over HTTP for callers that cannot link the
//! library directly. Flags are either sent with each request or preloaded
//! from a JSON file named by `FLAGS_PATH` and validated once at startup.

mod config;
mod error;
mod handlers;
mod registry;
mod routes;

use crate::config::Config;
use crate::registry::FlagRegistry;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FlagRegistry>,
}

/// Build the router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchyard_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        "Starting Switchyard Server on {}:{} (hash version {})",
        config.host,
        config.port,
        switchyard_engine::HASH_VERSION
    );

    let registry = match &config.flags_path {
        Some(path) => {
            tracing::info!("Loading flags from {}", path.display());
            let registry = FlagRegistry::load(path)?;
            tracing::info!("Loaded {} flags: {:?}", registry.len(), registry.keys());
            registry
        }
        None => {
            tracing::info!("FLAGS_PATH not set, serving ad-hoc evaluation only");
            FlagRegistry::default()
        }
    };

    let state = AppState {
        registry: Arc::new(registry),
    };

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
