//! Policy Hub API Server
//!
//! REST API for browsing a policy hub, installing its bundles and
//! managing the local policy store.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Hub
        .route("/api/hub/index", get(handlers::hub_index))
        .route("/api/hub/install", post(handlers::install_bundle))
        .route("/api/hub/install/batch", post(handlers::install_batch))
        // Policies
        .route("/api/policies", post(handlers::add_policy).get(handlers::list_policies))
        .route("/api/policies/:id", get(handlers::get_policy))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
