//! Invitation aggregate entity.
//!
//! A time-boxed, single-use offer to join a project in a role. The canonical
//! seat policy: the wallet is debited exactly once, at acceptance. Creation
//! only validates sufficiency; cancellation and expiry never touch balances
//! because none was applied.
//!
//! # State machine
//!
//! ```text
//!   create          accept (consume seat)
//!  ───────► pending ─────────────────────► accepted (terminal)
//!              │  \
//!              │   \ cancel
//!              │    ▼
//!         expire(time)  cancelled (terminal)
//!              ▼
//!          expired (terminal)
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, InvitationId, ProjectId, Timestamp, UserId};
use crate::domain::project::RoleKind;

use super::{InvitationStatus, InvitationToken};

/// Validity window for a fresh or re-issued invitation.
pub const INVITATION_TTL_HOURS: i64 = 72;

/// Contact details for the invited person, when known at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Invitation aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    /// Unique identifier.
    pub id: InvitationId,

    /// Project the invitation grants a role in.
    pub project_id: ProjectId,

    /// Role granted on acceptance.
    pub role: RoleKind,

    /// Unguessable single-use token.
    pub token: InvitationToken,

    /// Lifecycle status.
    pub status: InvitationStatus,

    /// Facilitator who issued the invitation.
    pub created_by: UserId,

    /// Contact details of the invited person, if provided.
    pub contact: ContactInfo,

    /// When the invitation was created.
    pub created_at: Timestamp,

    /// Acceptance deadline.
    pub expires_at: Timestamp,

    /// When the invitation was accepted.
    pub used_at: Option<Timestamp>,

    /// When the invitation was cancelled.
    pub cancelled_at: Option<Timestamp>,
}

impl Invitation {
    /// Creates a pending invitation with a fresh token and a 72-hour window.
    pub fn create(
        project_id: ProjectId,
        role: RoleKind,
        created_by: UserId,
        contact: ContactInfo,
        now: Timestamp,
    ) -> Self {
        Self {
            id: InvitationId::new(),
            project_id,
            role,
            token: InvitationToken::generate(),
            status: InvitationStatus::Pending,
            created_by,
            contact,
            created_at: now,
            expires_at: now.add_hours(INVITATION_TTL_HOURS),
            used_at: None,
            cancelled_at: None,
        }
    }

    /// Whether the deadline has passed.
    ///
    /// Checked at every consumer, independent of the cleanup sweep: a pending
    /// invitation past its deadline is invalid even before the sweep runs.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    /// Whether the invitation can be accepted at `now`.
    pub fn is_acceptable(&self, now: Timestamp) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }

    /// Marks the invitation accepted.
    ///
    /// # Errors
    ///
    /// `INVALID_INVITATION` unless the invitation is pending and unexpired.
    pub fn accept(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if !self.is_acceptable(now) {
            return Err(invalid_invitation(self.status, self.is_expired(now)));
        }
        self.status = InvitationStatus::Accepted;
        self.used_at = Some(now);
        Ok(())
    }

    /// Cancels a pending invitation. No wallet effect.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.status != InvitationStatus::Pending {
            return Err(DomainError::new(
                ErrorCode::InvalidInvitation,
                format!("Cannot cancel a {} invitation", self.status),
            ));
        }
        self.status = InvitationStatus::Cancelled;
        self.cancelled_at = Some(now);
        Ok(())
    }

    /// Flips a pending invitation past its deadline to expired. No wallet
    /// effect.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.status != InvitationStatus::Pending || !self.is_expired(now) {
            return Err(DomainError::new(
                ErrorCode::InvalidInvitation,
                "Only overdue pending invitations can be expired",
            ));
        }
        self.status = InvitationStatus::Expired;
        Ok(())
    }

    /// Re-issues a non-accepted invitation: fresh token, fresh 72-hour
    /// window, back to pending.
    pub fn reissue(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.status == InvitationStatus::Accepted {
            return Err(DomainError::new(
                ErrorCode::InvalidInvitation,
                "Accepted invitations cannot be re-sent",
            ));
        }
        self.token = InvitationToken::generate();
        self.status = InvitationStatus::Pending;
        self.expires_at = now.add_hours(INVITATION_TTL_HOURS);
        self.cancelled_at = None;
        Ok(())
    }
}

fn invalid_invitation(status: InvitationStatus, expired: bool) -> DomainError {
    let reason = if status != InvitationStatus::Pending {
        format!("Invitation is {}", status)
    } else if expired {
        "Invitation has expired".to_string()
    } else {
        "Invitation is not acceptable".to_string()
    };
    DomainError::new(ErrorCode::InvalidInvitation, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn pending_invitation() -> Invitation {
        Invitation::create(
            ProjectId::new(),
            RoleKind::Facilitator,
            UserId::new(),
            ContactInfo::default(),
            now(),
        )
    }

    #[test]
    fn create_opens_a_72_hour_window() {
        let invitation = pending_invitation();
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(
            invitation.expires_at.as_unix_secs() - invitation.created_at.as_unix_secs(),
            72 * 3600
        );
    }

    #[test]
    fn accept_within_window_records_used_at() {
        let mut invitation = pending_invitation();
        let at = now().add_hours(1);

        invitation.accept(at).unwrap();
        assert_eq!(invitation.status, InvitationStatus::Accepted);
        assert_eq!(invitation.used_at, Some(at));
    }

    #[test]
    fn accept_exactly_once() {
        let mut invitation = pending_invitation();
        invitation.accept(now().add_hours(1)).unwrap();

        let err = invitation.accept(now().add_hours(2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInvitation);
    }

    #[test]
    fn accept_fails_past_deadline_even_without_sweep() {
        let mut invitation = pending_invitation();
        // Still pending in storage; only the clock has moved.
        let err = invitation.accept(now().add_hours(73)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInvitation);
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert!(invitation.used_at.is_none());
    }

    #[test]
    fn deadline_boundary_is_exclusive() {
        let invitation = pending_invitation();
        let deadline = invitation.expires_at;
        assert!(invitation.is_acceptable(deadline.add_hours(-1)));
        assert!(!invitation.is_acceptable(deadline));
    }

    #[test]
    fn cancel_only_from_pending() {
        let mut invitation = pending_invitation();
        invitation.cancel(now().add_hours(1)).unwrap();
        assert_eq!(invitation.status, InvitationStatus::Cancelled);
        assert!(invitation.cancelled_at.is_some());

        let mut accepted = pending_invitation();
        accepted.accept(now()).unwrap();
        assert!(accepted.cancel(now()).is_err());
    }

    #[test]
    fn expire_requires_overdue_pending() {
        let mut invitation = pending_invitation();
        assert!(invitation.expire(now().add_hours(1)).is_err());

        invitation.expire(now().add_hours(73)).unwrap();
        assert_eq!(invitation.status, InvitationStatus::Expired);
    }

    #[test]
    fn reissue_rotates_token_and_resets_window() {
        let mut invitation = pending_invitation();
        let old_token = invitation.token.clone();

        let later = now().add_hours(100);
        invitation.expire(later).unwrap();
        invitation.reissue(later).unwrap();

        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_ne!(invitation.token, old_token);
        assert_eq!(invitation.expires_at, later.add_hours(72));
    }

    #[test]
    fn reissue_refuses_accepted_invitations() {
        let mut invitation = pending_invitation();
        invitation.accept(now()).unwrap();
        assert!(invitation.reissue(now().add_hours(1)).is_err());
    }
}
