//! Axum router configuration for project endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{create_project, ProjectAppState};

/// Create the project API router.
///
/// # Routes
///
/// - `POST /` - Create a project, consuming one project voucher
pub fn project_routes() -> Router<ProjectAppState> {
    Router::new().route("/", post(create_project))
}
