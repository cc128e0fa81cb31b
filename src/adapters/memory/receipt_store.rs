//! In-memory receipt store.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::PurchaseReceipt;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{ReceiptSaveResult, ReceiptStore};

/// In-memory [`ReceiptStore`].
///
/// The mutex makes save-if-absent atomic: racing confirmations observe
/// first-wins, as with the unique payment-reference index in PostgreSQL.
#[derive(Default)]
pub struct InMemoryReceiptStore {
    receipts: Mutex<Vec<PurchaseReceipt>>,
    fail_saves: Mutex<bool>,
}

impl InMemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent saves fail, for saga retry-path tests.
    pub fn fail_next_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap() = fail;
    }

    /// Number of stored receipts.
    pub fn len(&self) -> usize {
        self.receipts.lock().unwrap().len()
    }

    /// Whether no receipts are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReceiptStore for InMemoryReceiptStore {
    async fn save(&self, receipt: &PurchaseReceipt) -> Result<ReceiptSaveResult, DomainError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated receipt save failure",
            ));
        }

        let mut receipts = self.receipts.lock().unwrap();
        if receipts
            .iter()
            .any(|r| r.payment_intent_id == receipt.payment_intent_id)
        {
            return Ok(ReceiptSaveResult::AlreadyExists);
        }
        receipts.push(receipt.clone());
        Ok(ReceiptSaveResult::Inserted)
    }

    async fn find_by_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PurchaseReceipt>, DomainError> {
        Ok(self
            .receipts
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.payment_intent_id == payment_intent_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<PurchaseReceipt>, DomainError> {
        let mut receipts: Vec<_> = self
            .receipts
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        receipts.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        Ok(receipts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::Package;
    use crate::domain::foundation::{PackageId, Timestamp};
    use crate::domain::wallet::ResourceBundle;

    fn receipt(payment: &str) -> PurchaseReceipt {
        let package = Package {
            id: PackageId::new(),
            name: "Starter".to_string(),
            price_cents: 9900,
            currency: "usd".to_string(),
            resources: ResourceBundle::default(),
            is_active: true,
        };
        PurchaseReceipt::issue(
            UserId::new(),
            payment,
            &package,
            Timestamp::from_unix_secs(1_700_000_000),
        )
    }

    #[tokio::test]
    async fn save_is_first_wins_per_payment() {
        let store = InMemoryReceiptStore::new();
        let first = receipt("pi_1");

        assert_eq!(
            store.save(&first).await.unwrap(),
            ReceiptSaveResult::Inserted
        );
        assert_eq!(
            store.save(&receipt("pi_1")).await.unwrap(),
            ReceiptSaveResult::AlreadyExists
        );
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.find_by_payment("pi_1").await.unwrap().unwrap().receipt_id,
            first.receipt_id
        );
    }

    #[tokio::test]
    async fn find_by_payment_misses_unknown_references() {
        let store = InMemoryReceiptStore::new();
        assert!(store.find_by_payment("pi_none").await.unwrap().is_none());
    }
}
