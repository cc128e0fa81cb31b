//! HTTP handlers for project endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::application::handlers::project::{CreateProjectCommand, CreateProjectHandler};

use super::super::error::domain_error_response;
use super::super::extract::AuthenticatedUser;
use super::dto::{CreateProjectRequest, CreateProjectResponse};

/// Shared state for project endpoints.
#[derive(Clone)]
pub struct ProjectAppState {
    pub create_project: Arc<CreateProjectHandler>,
}

/// `POST /api/projects`
pub async fn create_project(
    State(state): State<ProjectAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateProjectRequest>,
) -> Response {
    let cmd = CreateProjectCommand {
        user_id: user.user_id,
        name: request.name,
        description: request.description,
    };

    match state.create_project.handle(cmd).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(CreateProjectResponse::from(result)),
        )
            .into_response(),
        Err(err) => domain_error_response(err),
    }
}
