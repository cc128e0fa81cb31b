//! Receipt store port.
//!
//! Receipts are write-once and unique per payment reference. The save
//! contract mirrors webhook idempotency handling: when two confirmations
//! race, the first insert wins and the loser observes `AlreadyExists`.

use async_trait::async_trait;

use crate::domain::billing::PurchaseReceipt;
use crate::domain::foundation::{DomainError, UserId};

/// Result of attempting to persist a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptSaveResult {
    /// This call inserted the receipt.
    Inserted,

    /// A receipt for the payment reference already existed.
    AlreadyExists,
}

/// Port for receipt persistence.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Persists a receipt unless one already exists for its payment
    /// reference.
    async fn save(&self, receipt: &PurchaseReceipt) -> Result<ReceiptSaveResult, DomainError>;

    /// Looks up the receipt for a payment reference.
    ///
    /// The purchase saga's idempotency guard.
    async fn find_by_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PurchaseReceipt>, DomainError>;

    /// All receipts for a user, newest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<PurchaseReceipt>, DomainError>;
}
