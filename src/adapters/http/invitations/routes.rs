//! Axum router configuration for invitation endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{
    accept_invitation, create_invitation, invalidate_project_invitations, resend_invitation,
    InvitationAppState,
};

/// Create the invitation API router.
///
/// # Routes
///
/// - `POST /` - Create an invitation (facilitators only)
/// - `POST /:token/accept` - Accept by token (no auth required; new users
///   are created inline)
/// - `POST /:id/resend` - Rotate token and extend the window
/// - `POST /project/:project_id/invalidate` - Cancel all open invitations
pub fn invitation_routes() -> Router<InvitationAppState> {
    Router::new()
        .route("/", post(create_invitation))
        .route("/:token/accept", post(accept_invitation))
        .route("/:id/resend", post(resend_invitation))
        .route(
            "/project/:project_id/invalidate",
            post(invalidate_project_invitations),
        )
}
