//! API Routes
//!
//! - `/process-pnrl/`, `/process-acta/` - Word uploads (power of attorney, incorporation act)
//! - `/process-CSF/`, `/process-CB/`, `/process-ID/` - PDF uploads (tax status, bank statement, ID)
//! - `/health` - Health check

pub mod extract;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let body_limit = state.config.uploads.max_bytes;
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(extract::router(state.clone()))
        .merge(health::router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
