//! Invitation repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, InvitationId, ProjectId, Timestamp};
use crate::domain::invitation::{Invitation, InvitationStatus, InvitationToken};

/// Repository port for invitation persistence.
///
/// Implementations must enforce token uniqueness. Status changes go through
/// [`InvitationRepository::transition`], a compare-and-set on the stored
/// status: when two accept requests race, exactly one transition succeeds and
/// the loser observes `CONCURRENCY_CONFLICT`.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Persists a new invitation.
    async fn save(&self, invitation: &Invitation) -> Result<(), DomainError>;

    /// Persists a mutated invitation only if the stored status still equals
    /// `expected`.
    ///
    /// # Errors
    ///
    /// - `INVITATION_NOT_FOUND` if the invitation does not exist
    /// - `CONCURRENCY_CONFLICT` if the stored status moved on; the caller
    ///   lost a race and must not assume its transition applied
    async fn transition(
        &self,
        invitation: &Invitation,
        expected: InvitationStatus,
    ) -> Result<(), DomainError>;

    /// Looks up an invitation by id.
    async fn find_by_id(&self, id: &InvitationId) -> Result<Option<Invitation>, DomainError>;

    /// Looks up an invitation by its token.
    ///
    /// The primary acceptance-path lookup; tokens are unique.
    async fn find_by_token(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DomainError>;

    /// All pending invitations for a project.
    async fn list_pending_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Invitation>, DomainError>;

    /// All pending invitations whose deadline has passed at `now`.
    ///
    /// Feeds the periodic expiry sweep.
    async fn list_overdue(&self, now: Timestamp) -> Result<Vec<Invitation>, DomainError>;
}
