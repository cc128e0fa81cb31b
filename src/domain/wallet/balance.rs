//! Wallet aggregate entity.
//!
//! One wallet per user, created lazily on the first resource-related request
//! and never deleted. Balances are maintained directly; the ledger
//! (`super::ledger`) is the audit trail.
//!
//! # Invariants
//!
//! - `user_id` is unique (one wallet per user)
//! - No balance may be negative at any committed state

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, Timestamp, UserId};

use super::{ResourceBundle, ResourceType};

/// Wallet aggregate - per-user balances of vouchers and seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// User who owns this wallet.
    pub user_id: UserId,

    /// Vouchers available for project creation.
    pub project_vouchers: i64,

    /// Seats available for facilitator invitations.
    pub facilitator_seats: i64,

    /// Seats available for storyteller invitations.
    pub storyteller_seats: i64,

    /// When the wallet was created.
    pub created_at: Timestamp,

    /// When the wallet was last updated.
    pub updated_at: Timestamp,
}

impl Wallet {
    /// Creates a zeroed wallet for a user.
    pub fn zeroed(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            project_vouchers: 0,
            facilitator_seats: 0,
            storyteller_seats: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current balance of one resource.
    pub fn balance_of(&self, resource: ResourceType) -> i64 {
        match resource {
            ResourceType::ProjectVoucher => self.project_vouchers,
            ResourceType::FacilitatorSeat => self.facilitator_seats,
            ResourceType::StorytellerSeat => self.storyteller_seats,
        }
    }

    /// All balances as a bundle snapshot.
    pub fn balances(&self) -> ResourceBundle {
        ResourceBundle {
            project_vouchers: self.project_vouchers,
            facilitator_seats: self.facilitator_seats,
            storyteller_seats: self.storyteller_seats,
        }
    }

    /// Whether the wallet can cover a debit of `amount` of `resource`.
    pub fn can_cover(&self, resource: ResourceType, amount: i64) -> bool {
        self.balance_of(resource) >= amount
    }

    /// Applies signed per-resource deltas, rejecting any delta that would
    /// drive a balance negative. The caller is responsible for making the
    /// check-and-apply atomic with the matching ledger append.
    pub fn apply_deltas(
        &mut self,
        deltas: &ResourceBundle,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        for (resource, delta) in deltas.non_zero() {
            let balance = self.balance_of(resource);
            if balance + delta < 0 {
                return Err(DomainError::insufficient_resources(
                    resource.as_str(),
                    -delta,
                    balance,
                ));
            }
        }

        self.project_vouchers += deltas.project_vouchers;
        self.facilitator_seats += deltas.facilitator_seats;
        self.storyteller_seats += deltas.storyteller_seats;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn test_wallet() -> Wallet {
        let mut wallet = Wallet::zeroed(UserId::new(), Timestamp::from_unix_secs(1_700_000_000));
        wallet.project_vouchers = 2;
        wallet.facilitator_seats = 3;
        wallet.storyteller_seats = 1;
        wallet
    }

    #[test]
    fn zeroed_wallet_has_no_resources() {
        let wallet = Wallet::zeroed(UserId::new(), Timestamp::now());
        for resource in ResourceType::ALL {
            assert_eq!(wallet.balance_of(resource), 0);
        }
    }

    #[test]
    fn apply_deltas_debits_and_credits() {
        let mut wallet = test_wallet();
        let now = wallet.created_at.add_hours(1);

        let mut deltas = ResourceBundle::empty();
        deltas.add(ResourceType::ProjectVoucher, -1);
        deltas.add(ResourceType::FacilitatorSeat, 2);

        wallet.apply_deltas(&deltas, now).unwrap();
        assert_eq!(wallet.project_vouchers, 1);
        assert_eq!(wallet.facilitator_seats, 5);
        assert_eq!(wallet.updated_at, now);
    }

    #[test]
    fn apply_deltas_rejects_overdraft_without_partial_application() {
        let mut wallet = test_wallet();
        let before = wallet.clone();

        let mut deltas = ResourceBundle::empty();
        deltas.add(ResourceType::FacilitatorSeat, 1);
        deltas.add(ResourceType::StorytellerSeat, -2);

        let err = wallet.apply_deltas(&deltas, Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientResources);
        assert_eq!(err.details.get("resource"), Some(&"storyteller_seat".to_string()));
        // No balance moved, including the resource that had room.
        assert_eq!(wallet, before);
    }

    #[test]
    fn can_cover_compares_against_balance() {
        let wallet = test_wallet();
        assert!(wallet.can_cover(ResourceType::FacilitatorSeat, 3));
        assert!(!wallet.can_cover(ResourceType::FacilitatorSeat, 4));
    }

    #[test]
    fn balances_snapshot_matches_fields() {
        let wallet = test_wallet();
        let bundle = wallet.balances();
        assert_eq!(bundle.project_vouchers, 2);
        assert_eq!(bundle.facilitator_seats, 3);
        assert_eq!(bundle.storyteller_seats, 1);
    }
}
