//! Ledger reader port (read side).
//!
//! Query surface over the append-only wallet ledger: transaction history,
//! payment-reference lookups for idempotency guards, and per-resource sums
//! for reconciliation.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::wallet::{LedgerEntry, ResourceType};

/// Port for reading the wallet ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Most recent entries for a user, newest first.
    async fn entries_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<LedgerEntry>, DomainError>;

    /// Entries linked to a payment reference.
    ///
    /// Non-empty means the payment has already credited the wallet; the
    /// purchase saga uses this to refuse double-crediting.
    async fn find_by_payment(&self, payment_id: &str) -> Result<Vec<LedgerEntry>, DomainError>;

    /// Sum of entry amounts for a (user, resource) pair.
    ///
    /// The reconciliation invariant requires this to equal the wallet balance
    /// after every committed operation.
    async fn sum_for(&self, user_id: &UserId, resource: ResourceType)
        -> Result<i64, DomainError>;
}
