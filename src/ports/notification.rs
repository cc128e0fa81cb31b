//! Receipt notification port.
//!
//! Fire-and-forget from the purchase saga's point of view: by the time a
//! confirmation email is attempted, money has moved and resources are
//! credited, so notification failures are logged and swallowed, never
//! surfaced to the purchaser.

use async_trait::async_trait;

use crate::domain::billing::PurchaseReceipt;
use crate::domain::foundation::DomainError;

/// Port for sending purchase confirmations.
#[async_trait]
pub trait ReceiptNotifier: Send + Sync {
    /// Sends a purchase confirmation for a completed purchase.
    async fn send_purchase_confirmation(
        &self,
        receipt: &PurchaseReceipt,
    ) -> Result<(), DomainError>;
}
