//! Router configuration for the IVR gateway

use std::path::Path;

use axum::{
    routing::{any, get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handlers;
use crate::AppState;

/// Create the main router with all routes; the web form is served from `public_dir`
pub fn create_router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        // Call trigger
        .route("/api/call", post(handlers::trigger_call))
        // IVR webhooks (provider may use GET or POST)
        .route("/ivr/welcome", any(handlers::ivr_welcome))
        .route("/ivr/level1_process", any(handlers::ivr_language_process))
        .route("/ivr/action_process", any(handlers::ivr_action_process))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
