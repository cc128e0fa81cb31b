//! ResendInvitationHandler - rotates the token on a non-accepted invitation.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, InvitationId, UserId};
use crate::domain::invitation::Invitation;
use crate::domain::project::RoleKind;
use crate::ports::{Clock, InvitationRepository, ProjectStore};

/// Command to re-send an invitation.
#[derive(Debug, Clone)]
pub struct ResendInvitationCommand {
    pub invitation_id: InvitationId,
    pub requested_by: UserId,
}

/// Handler for invitation re-sending.
///
/// Issues a fresh token and a fresh 72-hour window; never touches the
/// wallet.
pub struct ResendInvitationHandler {
    invitations: Arc<dyn InvitationRepository>,
    projects: Arc<dyn ProjectStore>,
    clock: Arc<dyn Clock>,
}

impl ResendInvitationHandler {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        projects: Arc<dyn ProjectStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            invitations,
            projects,
            clock,
        }
    }

    pub async fn handle(&self, cmd: ResendInvitationCommand) -> Result<Invitation, DomainError> {
        let mut invitation = self
            .invitations
            .find_by_id(&cmd.invitation_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::InvitationNotFound, "Invitation not found")
            })?;

        let is_facilitator = self
            .projects
            .has_active_role(&cmd.requested_by, &invitation.project_id, RoleKind::Facilitator)
            .await?;
        if !is_facilitator {
            return Err(DomainError::new(
                ErrorCode::AccessDenied,
                "Only project facilitators can re-send invitations",
            ));
        }

        let previous_status = invitation.status;
        invitation.reissue(self.clock.now())?;
        self.invitations
            .transition(&invitation, previous_status)
            .await?;

        tracing::info!(
            invitation_id = %invitation.id,
            project_id = %invitation.project_id,
            "Re-sent invitation with fresh token"
        );

        Ok(invitation)
    }
}
