//! HTTP handlers for invitation endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::application::handlers::invitation::{
    AcceptInvitationCommand, AcceptInvitationHandler, CreateInvitationCommand,
    CreateInvitationHandler, InvalidateProjectInvitationsCommand,
    InvalidateProjectInvitationsHandler, ResendInvitationCommand, ResendInvitationHandler,
};
use crate::domain::foundation::{InvitationId, ProjectId};
use crate::domain::invitation::ContactInfo;
use crate::ports::NewUser;

use super::super::error::{domain_error_response, ErrorResponse};
use super::super::extract::{AuthenticatedUser, MaybeAuthenticatedUser};
use super::dto::{
    AcceptInvitationRequest, AcceptInvitationResponse, CreateInvitationRequest,
    InvalidateInvitationsResponse, InvitationResponse,
};

/// Shared state for invitation endpoints.
#[derive(Clone)]
pub struct InvitationAppState {
    pub create_invitation: Arc<CreateInvitationHandler>,
    pub accept_invitation: Arc<AcceptInvitationHandler>,
    pub resend_invitation: Arc<ResendInvitationHandler>,
    pub invalidate_invitations: Arc<InvalidateProjectInvitationsHandler>,
}

fn bad_request(message: &str) -> Response {
    let error = ErrorResponse::new("VALIDATION_FAILED", message);
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

/// `POST /api/invitations`
pub async fn create_invitation(
    State(state): State<InvitationAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateInvitationRequest>,
) -> Response {
    let project_id: ProjectId = match request.project_id.parse() {
        Ok(id) => id,
        Err(_) => return bad_request("project_id must be a UUID"),
    };

    let cmd = CreateInvitationCommand {
        project_id,
        creator_user_id: user.user_id,
        role: request.role,
        contact: ContactInfo {
            name: request.contact_name,
            email: request.contact_email,
            phone: request.contact_phone,
        },
    };

    match state.create_invitation.handle(cmd).await {
        Ok(invitation) => (
            StatusCode::CREATED,
            Json(InvitationResponse::from(invitation)),
        )
            .into_response(),
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/invitations/:token/accept`
pub async fn accept_invitation(
    State(state): State<InvitationAppState>,
    Path(token): Path<String>,
    user: MaybeAuthenticatedUser,
    Json(request): Json<AcceptInvitationRequest>,
) -> Response {
    let new_user = request.name.as_ref().map(|name| NewUser {
        name: name.clone(),
        email: request.email.clone(),
        phone: request.phone.clone(),
    });

    let cmd = AcceptInvitationCommand {
        token,
        authenticated_user_id: user.0,
        new_user,
    };

    match state.accept_invitation.handle(cmd).await {
        Ok(result) => (
            StatusCode::OK,
            Json(AcceptInvitationResponse::from(result)),
        )
            .into_response(),
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/invitations/:id/resend`
pub async fn resend_invitation(
    State(state): State<InvitationAppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Response {
    let invitation_id: InvitationId = match id.parse() {
        Ok(id) => id,
        Err(_) => return bad_request("invitation id must be a UUID"),
    };

    let cmd = ResendInvitationCommand {
        invitation_id,
        requested_by: user.user_id,
    };

    match state.resend_invitation.handle(cmd).await {
        Ok(invitation) => {
            (StatusCode::OK, Json(InvitationResponse::from(invitation))).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/invitations/project/:project_id/invalidate`
pub async fn invalidate_project_invitations(
    State(state): State<InvitationAppState>,
    user: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Response {
    let project_id: ProjectId = match project_id.parse() {
        Ok(id) => id,
        Err(_) => return bad_request("project_id must be a UUID"),
    };

    let cmd = InvalidateProjectInvitationsCommand {
        project_id,
        requested_by: user.user_id,
    };

    match state.invalidate_invitations.handle(cmd).await {
        Ok(cancelled) => (
            StatusCode::OK,
            Json(InvalidateInvitationsResponse { cancelled }),
        )
            .into_response(),
        Err(err) => domain_error_response(err),
    }
}
