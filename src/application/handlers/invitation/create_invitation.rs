//! CreateInvitationHandler - Command handler for issuing invitations.
//!
//! Creation validates seat sufficiency but never debits the wallet; the
//! debit happens exactly once, at acceptance.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, UserId};
use crate::domain::invitation::{ContactInfo, Invitation};
use crate::domain::project::{RoleAssignmentValidator, RoleKind};
use crate::domain::wallet::ResourceWalletService;
use crate::ports::{Clock, InvitationRepository, ProjectStore, UserDirectory};

/// Command to create an invitation to a project.
#[derive(Debug, Clone)]
pub struct CreateInvitationCommand {
    pub project_id: ProjectId,
    pub creator_user_id: UserId,
    pub role: RoleKind,
    pub contact: ContactInfo,
}

/// Handler for invitation creation.
pub struct CreateInvitationHandler {
    invitations: Arc<dyn InvitationRepository>,
    projects: Arc<dyn ProjectStore>,
    users: Arc<dyn UserDirectory>,
    wallet: Arc<ResourceWalletService>,
    validator: Arc<RoleAssignmentValidator>,
    clock: Arc<dyn Clock>,
}

impl CreateInvitationHandler {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        projects: Arc<dyn ProjectStore>,
        users: Arc<dyn UserDirectory>,
        wallet: Arc<ResourceWalletService>,
        validator: Arc<RoleAssignmentValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            invitations,
            projects,
            users,
            wallet,
            validator,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateInvitationCommand,
    ) -> Result<Invitation, DomainError> {
        // 1. Project must exist and the creator must facilitate it.
        self.projects
            .find_project(&cmd.project_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::ProjectNotFound, "Project not found"))?;

        let is_facilitator = self
            .projects
            .has_active_role(&cmd.creator_user_id, &cmd.project_id, RoleKind::Facilitator)
            .await?;
        if !is_facilitator {
            return Err(DomainError::new(
                ErrorCode::AccessDenied,
                "Only project facilitators can send invitations",
            ));
        }

        // 2. Role constraints, with the invited account resolved when the
        //    contact details already belong to someone.
        let target = self.resolve_target(&cmd.contact).await?;
        self.validator
            .validate(target.as_ref(), &cmd.project_id, cmd.role)
            .await?;

        // 3. At most one open storyteller invitation per project.
        if cmd.role == RoleKind::Storyteller {
            let pending = self
                .invitations
                .list_pending_for_project(&cmd.project_id)
                .await?;
            if pending.iter().any(|i| i.role == RoleKind::Storyteller) {
                return Err(DomainError::new(
                    ErrorCode::ProjectHasStoryteller,
                    "Project already has a pending storyteller invitation",
                ));
            }
        }

        // 4. Seat sufficiency pre-flight. Transaction-free: the seat itself
        //    is only consumed at acceptance.
        let seat = cmd.role.seat_resource();
        let sufficient = self
            .wallet
            .has_sufficient_resources(&cmd.creator_user_id, seat, 1)
            .await?;
        if !sufficient {
            let available = self
                .wallet
                .get_or_create_wallet(&cmd.creator_user_id)
                .await?
                .balance_of(seat);
            return Err(DomainError::insufficient_resources(seat.as_str(), 1, available));
        }

        let invitation = Invitation::create(
            cmd.project_id,
            cmd.role,
            cmd.creator_user_id,
            cmd.contact,
            self.clock.now(),
        );
        self.invitations.save(&invitation).await?;

        tracing::info!(
            invitation_id = %invitation.id,
            project_id = %invitation.project_id,
            role = %invitation.role,
            "Created invitation"
        );

        Ok(invitation)
    }

    async fn resolve_target(
        &self,
        contact: &ContactInfo,
    ) -> Result<Option<UserId>, DomainError> {
        if let Some(email) = &contact.email {
            if let Some(account) = self.users.find_by_email(email).await? {
                return Ok(Some(account.id));
            }
        }
        if let Some(phone) = &contact.phone {
            if let Some(account) = self.users.find_by_phone(phone).await? {
                return Ok(Some(account.id));
            }
        }
        Ok(None)
    }
}
