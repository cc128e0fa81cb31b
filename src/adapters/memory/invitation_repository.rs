//! In-memory invitation repository.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, InvitationId, ProjectId, Timestamp};
use crate::domain::invitation::{Invitation, InvitationStatus, InvitationToken};
use crate::ports::InvitationRepository;

/// In-memory [`InvitationRepository`].
///
/// One mutex over the map makes [`InvitationRepository::transition`] a true
/// compare-and-set, matching the conditional UPDATE the PostgreSQL adapter
/// issues.
#[derive(Default)]
pub struct InMemoryInvitationRepository {
    invitations: Mutex<HashMap<InvitationId, Invitation>>,
}

impl InMemoryInvitationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvitationRepository for InMemoryInvitationRepository {
    async fn save(&self, invitation: &Invitation) -> Result<(), DomainError> {
        let mut invitations = self.invitations.lock().unwrap();
        if invitations.values().any(|i| i.token == invitation.token) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Invitation token already exists",
            ));
        }
        invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn transition(
        &self,
        invitation: &Invitation,
        expected: InvitationStatus,
    ) -> Result<(), DomainError> {
        let mut invitations = self.invitations.lock().unwrap();
        let stored = invitations.get_mut(&invitation.id).ok_or_else(|| {
            DomainError::new(ErrorCode::InvitationNotFound, "Invitation not found")
        })?;

        if stored.status != expected {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Invitation moved from {} to {} behind this transition",
                    expected, stored.status
                ),
            ));
        }

        *stored = invitation.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &InvitationId) -> Result<Option<Invitation>, DomainError> {
        Ok(self.invitations.lock().unwrap().get(id).cloned())
    }

    async fn find_by_token(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DomainError> {
        Ok(self
            .invitations
            .lock()
            .unwrap()
            .values()
            .find(|i| &i.token == token)
            .cloned())
    }

    async fn list_pending_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Invitation>, DomainError> {
        Ok(self
            .invitations
            .lock()
            .unwrap()
            .values()
            .filter(|i| &i.project_id == project_id && i.status == InvitationStatus::Pending)
            .cloned()
            .collect())
    }

    async fn list_overdue(&self, now: Timestamp) -> Result<Vec<Invitation>, DomainError> {
        Ok(self
            .invitations
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.status == InvitationStatus::Pending && i.is_expired(now))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::invitation::ContactInfo;
    use crate::domain::project::RoleKind;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn pending() -> Invitation {
        Invitation::create(
            ProjectId::new(),
            RoleKind::Facilitator,
            UserId::new(),
            ContactInfo::default(),
            now(),
        )
    }

    #[tokio::test]
    async fn save_and_find_by_token() {
        let repo = InMemoryInvitationRepository::new();
        let invitation = pending();
        repo.save(&invitation).await.unwrap();

        let found = repo.find_by_token(&invitation.token).await.unwrap();
        assert_eq!(found, Some(invitation));
    }

    #[tokio::test]
    async fn transition_applies_when_expected_matches() {
        let repo = InMemoryInvitationRepository::new();
        let mut invitation = pending();
        repo.save(&invitation).await.unwrap();

        invitation.accept(now().add_hours(1)).unwrap();
        repo.transition(&invitation, InvitationStatus::Pending)
            .await
            .unwrap();

        let stored = repo.find_by_id(&invitation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Accepted);
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        let repo = InMemoryInvitationRepository::new();
        let original = pending();
        repo.save(&original).await.unwrap();

        // First accept wins.
        let mut first = original.clone();
        first.accept(now().add_hours(1)).unwrap();
        repo.transition(&first, InvitationStatus::Pending)
            .await
            .unwrap();

        // Second accept started from the same pending snapshot and loses.
        let mut second = original.clone();
        second.accept(now().add_hours(1)).unwrap();
        let err = repo
            .transition(&second, InvitationStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);
    }

    #[tokio::test]
    async fn list_overdue_sees_only_overdue_pending() {
        let repo = InMemoryInvitationRepository::new();
        let fresh = pending();
        let stale = pending();
        repo.save(&fresh).await.unwrap();
        repo.save(&stale).await.unwrap();

        let later = now().add_hours(73);
        // `fresh` was created at the same time, so both are overdue; accept
        // one first to keep it out of the sweep.
        let mut accepted = fresh.clone();
        accepted.accept(now().add_hours(1)).unwrap();
        repo.transition(&accepted, InvitationStatus::Pending)
            .await
            .unwrap();

        let overdue = repo.list_overdue(later).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, stale.id);
    }

    #[tokio::test]
    async fn duplicate_token_rejected() {
        let repo = InMemoryInvitationRepository::new();
        let invitation = pending();
        repo.save(&invitation).await.unwrap();
        assert!(repo.save(&invitation).await.is_err());
    }
}
