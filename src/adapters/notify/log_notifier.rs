//! Logging receipt notifier.
//!
//! Stand-in for the email/PDF receipt pipeline: records the confirmation in
//! the structured log. Failure semantics match the port contract (the saga
//! swallows errors), though this implementation cannot fail.

use async_trait::async_trait;

use crate::domain::billing::PurchaseReceipt;
use crate::domain::foundation::DomainError;
use crate::ports::ReceiptNotifier;

/// [`ReceiptNotifier`] that writes confirmations to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReceiptNotifier;

#[async_trait]
impl ReceiptNotifier for LoggingReceiptNotifier {
    async fn send_purchase_confirmation(
        &self,
        receipt: &PurchaseReceipt,
    ) -> Result<(), DomainError> {
        tracing::info!(
            receipt_id = %receipt.receipt_id,
            user_id = %receipt.user_id,
            payment_intent_id = %receipt.payment_intent_id,
            amount_cents = receipt.amount_cents,
            currency = %receipt.currency,
            "Purchase confirmation"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::Package;
    use crate::domain::foundation::{PackageId, Timestamp, UserId};
    use crate::domain::wallet::ResourceBundle;

    #[tokio::test]
    async fn logging_notifier_always_succeeds() {
        let package = Package {
            id: PackageId::new(),
            name: "Starter".to_string(),
            price_cents: 9900,
            currency: "usd".to_string(),
            resources: ResourceBundle::default(),
            is_active: true,
        };
        let receipt = PurchaseReceipt::issue(
            UserId::new(),
            "pi_1",
            &package,
            Timestamp::from_unix_secs(1_700_000_000),
        );

        assert!(LoggingReceiptNotifier
            .send_purchase_confirmation(&receipt)
            .await
            .is_ok());
    }
}
