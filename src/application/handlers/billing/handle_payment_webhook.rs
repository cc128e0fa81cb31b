//! HandlePaymentWebhookHandler - verified webhook ingestion.
//!
//! `payment.succeeded` events re-drive the idempotent confirmation saga;
//! replays land on the receipt guard and acknowledge cleanly. Failed
//! payments are logged and acknowledged - there is nothing to roll back
//! because nothing was credited.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{GatewayEventType, PaymentGateway};

use super::{ConfirmPurchaseCommand, ConfirmPurchaseHandler};

/// Command carrying the raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: String,
}

/// Outcome of processing one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A purchase was confirmed (or re-confirmed idempotently).
    Processed,

    /// The event is not one this core acts on.
    Ignored,
}

/// Handler for payment processor webhooks.
pub struct HandlePaymentWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
    confirm: Arc<ConfirmPurchaseHandler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, confirm: Arc<ConfirmPurchaseHandler>) -> Self {
        Self { gateway, confirm }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, DomainError> {
        // Signature failures are fatal for the delivery, never retried.
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(DomainError::from)?;

        match event.event_type {
            GatewayEventType::PaymentSucceeded => {
                let payment = self
                    .gateway
                    .retrieve_payment(&event.payment_id)
                    .await
                    .map_err(DomainError::from)?;

                let Some(user_id) = payment.user_id() else {
                    tracing::warn!(
                        event_id = %event.id,
                        payment_id = %event.payment_id,
                        "Succeeded payment without user metadata; ignoring"
                    );
                    return Ok(WebhookOutcome::Ignored);
                };

                let result = self
                    .confirm
                    .handle(ConfirmPurchaseCommand {
                        payment_reference: event.payment_id.clone(),
                        user_id,
                    })
                    .await;

                match result {
                    Ok(_) => Ok(WebhookOutcome::Processed),
                    // A non-package payment succeeding is not ours to credit.
                    Err(err) if err.code == ErrorCode::PackageNotFound => {
                        tracing::warn!(
                            event_id = %event.id,
                            payment_id = %event.payment_id,
                            "Succeeded payment does not reference a package; ignoring"
                        );
                        Ok(WebhookOutcome::Ignored)
                    }
                    Err(err) => Err(err),
                }
            }
            GatewayEventType::PaymentFailed => {
                tracing::info!(
                    event_id = %event.id,
                    payment_id = %event.payment_id,
                    "Payment failed; nothing credited, acknowledging"
                );
                Ok(WebhookOutcome::Ignored)
            }
            GatewayEventType::Unknown(event_type) => {
                tracing::debug!(
                    event_id = %event.id,
                    event_type = %event_type,
                    "Ignoring unhandled webhook event type"
                );
                Ok(WebhookOutcome::Ignored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryPackageCatalog, InMemoryReceiptStore, InMemoryWalletStore,
    };
    use crate::adapters::stripe::{MockPaymentGateway, MOCK_WEBHOOK_SIGNATURE};
    use crate::domain::billing::{Package, PurchaseReceipt};
    use crate::domain::foundation::{PackageId, Timestamp, UserId};
    use crate::domain::wallet::{ResourceBundle, ResourceWalletService, WalletPolicy};
    use crate::ports::{Clock, FixedClock, ReceiptNotifier, WalletStore};

    struct NullNotifier;

    #[async_trait::async_trait]
    impl ReceiptNotifier for NullNotifier {
        async fn send_purchase_confirmation(
            &self,
            _receipt: &PurchaseReceipt,
        ) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct Fixture {
        handler: HandlePaymentWebhookHandler,
        gateway: Arc<MockPaymentGateway>,
        wallet_store: Arc<InMemoryWalletStore>,
        user: UserId,
        package: Package,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(MockPaymentGateway::new());
        let catalog = Arc::new(InMemoryPackageCatalog::new());
        let receipts = Arc::new(InMemoryReceiptStore::new());
        let wallet_store = Arc::new(InMemoryWalletStore::new());
        let clock: Arc<dyn Clock> =
            Arc::new(FixedClock::at(Timestamp::from_unix_secs(1_700_000_000)));

        let package = Package {
            id: PackageId::new(),
            name: "Starter".to_string(),
            price_cents: 9900,
            currency: "usd".to_string(),
            resources: ResourceBundle {
                project_vouchers: 1,
                facilitator_seats: 2,
                storyteller_seats: 2,
            },
            is_active: true,
        };
        catalog.insert(package.clone());

        let wallet = Arc::new(ResourceWalletService::new(
            wallet_store.clone(),
            wallet_store.clone(),
            clock.clone(),
            WalletPolicy::default(),
        ));
        let confirm = Arc::new(ConfirmPurchaseHandler::new(
            gateway.clone(),
            catalog,
            receipts,
            wallet_store.clone(),
            wallet,
            Arc::new(NullNotifier),
            clock,
        ));

        Fixture {
            handler: HandlePaymentWebhookHandler::new(gateway.clone(), confirm),
            gateway,
            wallet_store,
            user: UserId::new(),
            package,
        }
    }

    fn succeeded_event(payment_id: &str) -> HandlePaymentWebhookCommand {
        HandlePaymentWebhookCommand {
            payload: format!(
                r#"{{"id":"evt_1","type":"payment_intent.succeeded","payment_id":"{}","created":1704067200}}"#,
                payment_id
            )
            .into_bytes(),
            signature: MOCK_WEBHOOK_SIGNATURE.to_string(),
        }
    }

    #[tokio::test]
    async fn succeeded_event_confirms_the_purchase() {
        let f = fixture();
        f.gateway.register_succeeded(
            "pi_1",
            9900,
            "usd",
            &f.package.id.to_string(),
            &f.user.to_string(),
        );

        let outcome = f.handler.handle(succeeded_event("pi_1")).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed);
        assert_eq!(
            f.wallet_store.find(&f.user).await.unwrap().unwrap().balances(),
            f.package.resources
        );
    }

    #[tokio::test]
    async fn redelivered_event_stays_exactly_once() {
        let f = fixture();
        f.gateway.register_succeeded(
            "pi_1",
            9900,
            "usd",
            &f.package.id.to_string(),
            &f.user.to_string(),
        );

        for _ in 0..3 {
            let outcome = f.handler.handle(succeeded_event("pi_1")).await.unwrap();
            assert_eq!(outcome, WebhookOutcome::Processed);
        }

        assert_eq!(f.wallet_store.ledger_entries().len(), 3);
    }

    #[tokio::test]
    async fn invalid_signature_is_rejected() {
        let f = fixture();
        let err = f
            .handler
            .handle(HandlePaymentWebhookCommand {
                payload: b"{}".to_vec(),
                signature: "forged".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn failed_payment_event_is_acknowledged() {
        let f = fixture();
        let outcome = f
            .handler
            .handle(HandlePaymentWebhookCommand {
                payload: br#"{"id":"evt_2","type":"payment_intent.payment_failed","payment_id":"pi_x"}"#
                    .to_vec(),
                signature: MOCK_WEBHOOK_SIGNATURE.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
        assert!(f.wallet_store.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn unknown_event_type_is_ignored() {
        let f = fixture();
        let outcome = f
            .handler
            .handle(HandlePaymentWebhookCommand {
                payload: br#"{"id":"evt_3","type":"charge.refunded","payment_id":"pi_x"}"#.to_vec(),
                signature: MOCK_WEBHOOK_SIGNATURE.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn succeeded_event_without_user_metadata_is_ignored() {
        let f = fixture();
        f.gateway.register_payment(crate::ports::PaymentDetails {
            id: "pi_1".to_string(),
            status: crate::ports::PaymentStatus::Succeeded,
            amount_cents: 9900,
            currency: "usd".to_string(),
            metadata: std::collections::HashMap::new(),
        });

        let outcome = f.handler.handle(succeeded_event("pi_1")).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
        assert!(f.wallet_store.ledger_entries().is_empty());
    }
}
