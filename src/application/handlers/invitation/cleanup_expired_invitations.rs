//! CleanupExpiredInvitationsHandler - periodic expiry sweep.
//!
//! Flips pending invitations past their deadline to expired. The sweep is
//! bookkeeping only: every consumer re-checks `expires_at` against the clock
//! independently, so a delayed sweep never makes a stale invitation
//! acceptable. No wallet effect.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::invitation::InvitationStatus;
use crate::ports::{Clock, InvitationRepository};

/// Handler for the expiry sweep.
pub struct CleanupExpiredInvitationsHandler {
    invitations: Arc<dyn InvitationRepository>,
    clock: Arc<dyn Clock>,
}

impl CleanupExpiredInvitationsHandler {
    pub fn new(invitations: Arc<dyn InvitationRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { invitations, clock }
    }

    /// Expires all overdue pending invitations, returning how many flipped.
    pub async fn handle(&self) -> Result<usize, DomainError> {
        let now = self.clock.now();
        let overdue = self.invitations.list_overdue(now).await?;

        let mut expired = 0;
        for mut invitation in overdue {
            if invitation.expire(now).is_err() {
                continue;
            }
            match self
                .invitations
                .transition(&invitation, InvitationStatus::Pending)
                .await
            {
                Ok(()) => expired += 1,
                Err(err) if err.code == ErrorCode::ConcurrencyConflict => continue,
                Err(err) => return Err(err),
            }
        }

        if expired > 0 {
            tracing::info!(expired, "Expired overdue invitations");
        }

        Ok(expired)
    }
}
