//! Assayer REST API
//!
//! HTTP backend for the valuation client, built with Axum. In development
//! the client shell proxies these paths here; in production the API can
//! serve the built client itself.
//!
//! # Endpoints
//!
//! ## Valuation
//! - `POST /check-weights` - Report unreadable weights (multipart `item_file`)
//! - `POST /calculate` - Valued item sheet as CSV (multipart `item_file`, `price_file`)
//! - `POST /calculate-fixed` - Valued corrected rows as CSV (JSON)
//! - `POST /upload` - Quick weight × price values (multipart)
//!
//! ## Items
//! - `POST /upload-items` - Import an item sheet
//! - `GET /items` - List items
//! - `GET /items/:id` - Get an item
//!
//! ## Editor
//! - `POST /edit-csv` - Edited grid as CSV
//!
//! ## Health
//! - `GET /ping` - Connectivity check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use assayer::api::{serve, AppState};
//! use assayer::config::ApiConfig;
//! use assayer::items::ItemStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let state = AppState::new(Arc::new(ItemStore::new()), config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::shell;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.max_upload_bytes;

    let api_routes = Router::new()
        // Valuation routes
        .route("/check-weights", post(routes::valuation::check_weights))
        .route("/calculate", post(routes::valuation::calculate))
        .route("/calculate-fixed", post(routes::valuation::calculate_fixed))
        .route("/upload", post(routes::valuation::quick_values))
        // Item routes
        .route("/upload-items", post(routes::items::upload_items))
        .route("/items", get(routes::items::list_items))
        .route("/items/:id", get(routes::items::get_item))
        // Editor routes
        .route("/edit-csv", post(routes::editor::edit_csv))
        .route("/ping", get(routes::health::ping))
        .layer(DefaultBodyLimit::max(max_upload));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let client = state.client.clone();
    let shared_state = Arc::new(state);

    let mut router = Router::new()
        .merge(api_routes)
        .nest("/health", health_routes)
        .with_state(shared_state);

    if let Some(client) = client {
        router = router
            .merge(shell::build_router(Arc::clone(&client)))
            .layer(middleware::from_fn_with_state(
                client,
                shell::serve_navigations,
            ));
    }

    router.layer(TraceLayer::new_for_http()).layer(cors)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    if let Some(client) = &state.client {
        tracing::info!(client_dir = %client.client_dir().display(), "Serving built client");
    }

    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Assayer API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Assayer API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
