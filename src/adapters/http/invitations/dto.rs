//! HTTP DTOs for invitation endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::invitation::AcceptInvitationResult;
use crate::domain::invitation::Invitation;
use crate::domain::project::RoleKind;

/// Request to create an invitation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitationRequest {
    /// Project to invite into.
    pub project_id: String,

    /// Role granted on acceptance.
    pub role: RoleKind,

    /// Contact details of the invited person (optional).
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Invitation details for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub project_id: String,
    pub role: RoleKind,
    pub token: String,
    pub status: String,
    /// Acceptance deadline (ISO 8601).
    pub expires_at: String,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id.to_string(),
            project_id: invitation.project_id.to_string(),
            role: invitation.role,
            token: invitation.token.to_string(),
            status: invitation.status.to_string(),
            expires_at: invitation.expires_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Request body for invitation acceptance.
///
/// Empty for signed-in users; new users supply name plus email or phone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcceptInvitationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Response for a successful acceptance.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptInvitationResponse {
    pub project_id: String,
    pub project_name: String,
    pub user_id: String,
    pub role: RoleKind,
}

impl From<AcceptInvitationResult> for AcceptInvitationResponse {
    fn from(result: AcceptInvitationResult) -> Self {
        Self {
            project_id: result.project.id.to_string(),
            project_name: result.project.name,
            user_id: result.user_id.to_string(),
            role: result.role,
        }
    }
}

/// Response for bulk invalidation.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateInvitationsResponse {
    pub cancelled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_invitation_request_deserializes() {
        let json = r#"{
            "project_id": "550e8400-e29b-41d4-a716-446655440000",
            "role": "storyteller",
            "contact_email": "nana@x.com"
        }"#;
        let request: CreateInvitationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.role, RoleKind::Storyteller);
        assert_eq!(request.contact_email.as_deref(), Some("nana@x.com"));
        assert!(request.contact_phone.is_none());
    }

    #[test]
    fn accept_invitation_request_accepts_empty_body() {
        let request: AcceptInvitationRequest = serde_json::from_str("{}").unwrap();
        assert!(request.name.is_none());
    }
}
