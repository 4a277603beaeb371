//! Assayer API Server
//!
//! Run with: cargo run --bin assayer-api
//!
//! # Configuration
//!
//! Read from `ASSAYER_CONFIG` or the default config locations, then
//! overridden by environment variables:
//! - `ASSAYER_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `ASSAYER_API_PORT` or `PORT`: Port to listen on (default: 8080)
//! - `ASSAYER_STATIC_DIR`: Built client to serve alongside the API (optional)
//! - `RUST_LOG`: Log filter (default: the configured level)

use assayer::api::{serve, AppState};
use assayer::config::Config;
use assayer::items::ItemStore;
use assayer::shell::Shell;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = Config::load_default();
    assayer::logging::init(&loaded.config.logging);
    loaded.log();
    let config = loaded.config;

    tracing::info!("Starting Assayer API server v{}", env!("CARGO_PKG_VERSION"));

    let items = Arc::new(ItemStore::new());
    let api_config = config.api.clone();

    let state = match &api_config.static_dir {
        Some(dir) => {
            tracing::info!("Serving built client from {}", dir);
            AppState::with_client(items, api_config.clone(), Shell::production(dir)?)
        }
        None => {
            tracing::info!("No static_dir configured, serving API only");
            AppState::new(items, api_config.clone())
        }
    };

    serve(state, &api_config).await?;

    tracing::info!("Assayer API server stopped");
    Ok(())
}
