//! Append-only wallet ledger.
//!
//! Every balance mutation is recorded as an immutable [`LedgerEntry`].
//! Reconciliation contract: for any (user, resource) pair, the sum of entry
//! amounts equals the wallet balance after every committed operation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ProjectId, Timestamp, TransactionId, UserId, ValidationError,
};

use super::{ResourceBundle, ResourceType, TransactionType};

/// Immutable audit record of one wallet balance mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: TransactionId,

    /// Wallet owner.
    pub user_id: UserId,

    /// Mutation classification.
    pub transaction_type: TransactionType,

    /// Resource the mutation applies to.
    pub resource_type: ResourceType,

    /// Signed quantity: negative for debits, positive for credits.
    pub amount: i64,

    /// Human-readable description for the audit trail.
    pub description: String,

    /// Project the mutation is linked to, if any.
    pub project_id: Option<ProjectId>,

    /// Payment reference the mutation is linked to, if any.
    pub payment_id: Option<String>,

    /// When the entry was committed.
    pub created_at: Timestamp,
}

impl LedgerEntry {
    /// Creates an entry, enforcing that the amount sign matches the
    /// transaction type (debits negative, credits positive) and is non-zero.
    pub fn new(
        user_id: UserId,
        transaction_type: TransactionType,
        resource_type: ResourceType,
        amount: i64,
        description: impl Into<String>,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if amount == 0 {
            return Err(ValidationError::non_positive_amount("amount", 0));
        }
        if transaction_type.is_debit() != (amount < 0) {
            return Err(ValidationError::invalid_format(
                "amount",
                format!(
                    "{} entries must carry a {} amount",
                    transaction_type,
                    if transaction_type.is_debit() { "negative" } else { "positive" }
                ),
            ));
        }

        Ok(Self {
            id: TransactionId::new(),
            user_id,
            transaction_type,
            resource_type,
            amount,
            description: description.into(),
            project_id: None,
            payment_id: None,
            created_at,
        })
    }

    /// Links the entry to a project.
    pub fn for_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Links the entry to a payment reference.
    pub fn for_payment(mut self, payment_id: impl Into<String>) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }
}

/// A set of ledger entries to commit together with their implied balance
/// deltas, as one unit of work.
///
/// Deltas are derived from the entries, so a store that applies both cannot
/// desynchronize the balance from the audit trail.
#[derive(Debug, Clone)]
pub struct WalletMutation {
    deltas: ResourceBundle,
    entries: Vec<LedgerEntry>,
}

impl WalletMutation {
    /// Builds a mutation from one or more entries for the same user.
    pub fn new(entries: Vec<LedgerEntry>) -> Result<Self, DomainError> {
        let first = entries.first().ok_or_else(|| {
            DomainError::validation("entries", "A wallet mutation needs at least one ledger entry")
        })?;

        let user_id = first.user_id;
        if entries.iter().any(|e| e.user_id != user_id) {
            return Err(DomainError::validation(
                "entries",
                "All entries in a wallet mutation must target the same wallet",
            ));
        }

        let mut deltas = ResourceBundle::empty();
        for entry in &entries {
            deltas.add(entry.resource_type, entry.amount);
        }

        Ok(Self { deltas, entries })
    }

    /// Signed per-resource balance deltas implied by the entries.
    pub fn deltas(&self) -> &ResourceBundle {
        &self.deltas
    }

    /// The ledger entries to append.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Wallet owner the mutation targets.
    pub fn user_id(&self) -> UserId {
        self.entries[0].user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[test]
    fn consume_entry_requires_negative_amount() {
        let user = UserId::new();
        assert!(LedgerEntry::new(
            user,
            TransactionType::Consume,
            ResourceType::FacilitatorSeat,
            -1,
            "Consumed 1 facilitator_seat",
            now(),
        )
        .is_ok());

        assert!(LedgerEntry::new(
            user,
            TransactionType::Consume,
            ResourceType::FacilitatorSeat,
            1,
            "bad sign",
            now(),
        )
        .is_err());
    }

    #[test]
    fn credit_entry_requires_positive_amount() {
        let user = UserId::new();
        assert!(LedgerEntry::new(
            user,
            TransactionType::Purchase,
            ResourceType::ProjectVoucher,
            1,
            "Purchased 1 project_voucher",
            now(),
        )
        .is_ok());

        assert!(LedgerEntry::new(
            user,
            TransactionType::Refund,
            ResourceType::ProjectVoucher,
            -1,
            "bad sign",
            now(),
        )
        .is_err());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let err = LedgerEntry::new(
            UserId::new(),
            TransactionType::Grant,
            ResourceType::StorytellerSeat,
            0,
            "nothing",
            now(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn entry_links_to_project_and_payment() {
        let project = ProjectId::new();
        let entry = LedgerEntry::new(
            UserId::new(),
            TransactionType::Consume,
            ResourceType::ProjectVoucher,
            -1,
            "Consumed 1 project_voucher",
            now(),
        )
        .unwrap()
        .for_project(project)
        .for_payment("pi_test_123");

        assert_eq!(entry.project_id, Some(project));
        assert_eq!(entry.payment_id.as_deref(), Some("pi_test_123"));
    }

    #[test]
    fn mutation_derives_deltas_from_entries() {
        let user = UserId::new();
        let entries = vec![
            LedgerEntry::new(
                user,
                TransactionType::Purchase,
                ResourceType::ProjectVoucher,
                1,
                "Purchased 1 project_voucher",
                now(),
            )
            .unwrap(),
            LedgerEntry::new(
                user,
                TransactionType::Purchase,
                ResourceType::FacilitatorSeat,
                2,
                "Purchased 2 facilitator_seat",
                now(),
            )
            .unwrap(),
        ];

        let mutation = WalletMutation::new(entries).unwrap();
        assert_eq!(mutation.deltas().project_vouchers, 1);
        assert_eq!(mutation.deltas().facilitator_seats, 2);
        assert_eq!(mutation.deltas().storyteller_seats, 0);
        assert_eq!(mutation.user_id(), user);
    }

    #[test]
    fn mutation_rejects_empty_entry_list() {
        assert!(WalletMutation::new(vec![]).is_err());
    }

    #[test]
    fn mutation_rejects_mixed_wallets() {
        let a = LedgerEntry::new(
            UserId::new(),
            TransactionType::Grant,
            ResourceType::ProjectVoucher,
            1,
            "grant",
            now(),
        )
        .unwrap();
        let b = LedgerEntry::new(
            UserId::new(),
            TransactionType::Grant,
            ResourceType::ProjectVoucher,
            1,
            "grant",
            now(),
        )
        .unwrap();

        assert!(WalletMutation::new(vec![a, b]).is_err());
    }
}
