//! InvalidateProjectInvitationsHandler - bulk-cancels open invitations.
//!
//! Used when open invites are superseded, e.g. a storyteller is assigned
//! directly. No wallet effect: pending invitations never held a seat.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, UserId};
use crate::domain::invitation::InvitationStatus;
use crate::domain::project::RoleKind;
use crate::ports::{Clock, InvitationRepository, ProjectStore};

/// Command to cancel all pending invitations for a project.
#[derive(Debug, Clone)]
pub struct InvalidateProjectInvitationsCommand {
    pub project_id: ProjectId,
    pub requested_by: UserId,
}

/// Handler for bulk invitation invalidation.
pub struct InvalidateProjectInvitationsHandler {
    invitations: Arc<dyn InvitationRepository>,
    projects: Arc<dyn ProjectStore>,
    clock: Arc<dyn Clock>,
}

impl InvalidateProjectInvitationsHandler {
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

    /// Cancels every pending invitation for the project, returning the
    /// number cancelled. Invitations that race into a terminal state are
    /// skipped.
    pub async fn handle(
        &self,
        cmd: InvalidateProjectInvitationsCommand,
    ) -> Result<usize, DomainError> {
        let is_facilitator = self
            .projects
            .has_active_role(&cmd.requested_by, &cmd.project_id, RoleKind::Facilitator)
            .await?;
        if !is_facilitator {
            return Err(DomainError::new(
                ErrorCode::AccessDenied,
                "Only project facilitators can invalidate invitations",
            ));
        }

        let now = self.clock.now();
        let pending = self
            .invitations
            .list_pending_for_project(&cmd.project_id)
            .await?;

        let mut cancelled = 0;
        for mut invitation in pending {
            if invitation.cancel(now).is_err() {
                continue;
            }
            match self
                .invitations
                .transition(&invitation, InvitationStatus::Pending)
                .await
            {
                Ok(()) => cancelled += 1,
                Err(err) if err.code == ErrorCode::ConcurrencyConflict => {
                    // Accepted or swept between listing and cancelling.
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            project_id = %cmd.project_id,
            cancelled,
            "Invalidated open project invitations"
        );

        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryInvitationRepository, InMemoryProjectStore};
    use crate::domain::foundation::Timestamp;
    use crate::domain::invitation::{ContactInfo, Invitation};
    use crate::domain::project::{Project, ProjectRole, Subscription};
    use crate::ports::FixedClock;

    fn start() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[tokio::test]
    async fn cancels_all_pending_and_skips_terminal() {
        let invitations = Arc::new(InMemoryInvitationRepository::new());
        let projects = Arc::new(InMemoryProjectStore::new());
        let clock = Arc::new(FixedClock::at(start()));

        let owner = UserId::new();
        let project = Project::create(owner, "Family stories", None, start()).unwrap();
        projects
            .create_project(
                &project,
                &ProjectRole::new(owner, project.id, RoleKind::Facilitator, start()),
                &Subscription::initial_year(project.id, start()),
            )
            .await
            .unwrap();

        let mut accepted = Invitation::create(
            project.id,
            RoleKind::Facilitator,
            owner,
            ContactInfo::default(),
            start(),
        );
        invitations.save(&accepted).await.unwrap();
        accepted.accept(start()).unwrap();
        invitations
            .transition(&accepted, InvitationStatus::Pending)
            .await
            .unwrap();

        for _ in 0..2 {
            let open = Invitation::create(
                project.id,
                RoleKind::Facilitator,
                owner,
                ContactInfo::default(),
                start(),
            );
            invitations.save(&open).await.unwrap();
        }

        let handler = InvalidateProjectInvitationsHandler::new(
            invitations.clone(),
            projects,
            clock,
        );
        let cancelled = handler
            .handle(InvalidateProjectInvitationsCommand {
                project_id: project.id,
                requested_by: owner,
            })
            .await
            .unwrap();

        assert_eq!(cancelled, 2);
        assert!(invitations
            .list_pending_for_project(&project.id)
            .await
            .unwrap()
            .is_empty());
        // The accepted invitation is untouched.
        let stored = invitations.find_by_id(&accepted.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Accepted);
    }

    #[tokio::test]
    async fn requires_facilitator_role() {
        let invitations = Arc::new(InMemoryInvitationRepository::new());
        let projects = Arc::new(InMemoryProjectStore::new());
        let clock = Arc::new(FixedClock::at(start()));

        let handler = InvalidateProjectInvitationsHandler::new(invitations, projects, clock);
        let err = handler
            .handle(InvalidateProjectInvitationsCommand {
                project_id: ProjectId::new(),
                requested_by: UserId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessDenied);
    }
}
