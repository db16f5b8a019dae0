//! API route definitions
//!
//! - /health - liveness and record count
//! - /api/v1/meta - option lists and initial selections
//! - /api/v1/timeline - chart description for a request
//! - /api/v1/options/projects - project list for a selection
//! - /api/v1/options/pms - PM list for a selection

use axum::{routing::{get, post}, Router};

use super::handlers::{self, DashboardState};

/// Create the `/api/v1` routes
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/meta", get(handlers::meta))
        .route("/timeline", post(handlers::timeline))
        .route("/options/projects", post(handlers::project_options))
        .route("/options/pms", post(handlers::pm_options))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .with_state(state)
}
