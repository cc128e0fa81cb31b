//! Write-once purchase receipts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PackageId, ReceiptId, Timestamp, UserId};
use crate::domain::wallet::ResourceBundle;

use super::Package;

/// Durable snapshot of one completed purchase.
///
/// Keyed by `payment_intent_id` (unique): the same payment can never produce
/// two receipts, which is half of the exactly-once purchase guarantee; the
/// other half is the ledger's payment linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Unique identifier.
    pub receipt_id: ReceiptId,

    /// Purchasing user.
    pub user_id: UserId,

    /// Payment processor reference that funded the purchase.
    pub payment_intent_id: String,

    /// Package purchased.
    pub package_id: PackageId,

    /// Amount paid, integer cents.
    pub amount_cents: i64,

    /// ISO currency code.
    pub currency: String,

    /// Resources credited, snapshotted at purchase time.
    pub resources: ResourceBundle,

    /// When the purchase completed.
    pub purchase_date: Timestamp,
}

impl PurchaseReceipt {
    /// Snapshots a completed purchase.
    pub fn issue(
        user_id: UserId,
        payment_intent_id: impl Into<String>,
        package: &Package,
        now: Timestamp,
    ) -> Self {
        Self {
            receipt_id: ReceiptId::new(),
            user_id,
            payment_intent_id: payment_intent_id.into(),
            package_id: package.id,
            amount_cents: package.price_cents,
            currency: package.currency.clone(),
            resources: package.resources,
            purchase_date: now,
        }
    }
}
