//! ConfirmPurchaseHandler - the package purchase saga.
//!
//! Turns a confirmed external payment into wallet credit plus a durable
//! receipt, exactly once per payment reference:
//!
//! 1. Retrieve payment state from the gateway (never holding wallet state
//!    across this call).
//! 2. Idempotency guard: an existing receipt short-circuits to a replay
//!    response; ledger entries without a receipt mean the credit landed but
//!    the receipt didn't, so only the receipt is retried.
//! 3. Resolve the package from payment metadata.
//! 4. Exact integer-cents amount and currency validation.
//! 5. Atomic multi-resource credit.
//! 6. Write-once receipt.
//! 7. Fire-and-forget confirmation; notification failures never fail the
//!    purchase.

use std::sync::Arc;

use crate::domain::billing::PurchaseReceipt;
use crate::domain::foundation::{DomainError, ErrorCode, TransactionId, UserId};
use crate::domain::wallet::{ResourceWalletService, TransactionType, Wallet};
use crate::ports::{
    Clock, LedgerReader, PackageCatalog, PaymentGateway, ReceiptNotifier, ReceiptSaveResult,
    ReceiptStore,
};

/// Command to confirm a package purchase against a payment reference.
#[derive(Debug, Clone)]
pub struct ConfirmPurchaseCommand {
    pub payment_reference: String,
    pub user_id: UserId,
}

/// Result of a confirmed (or replayed) purchase.
#[derive(Debug, Clone)]
pub struct ConfirmPurchaseResult {
    /// Ledger entries written by this call; empty on replay.
    pub transaction_ids: Vec<TransactionId>,

    /// Wallet snapshot after the purchase.
    pub wallet: Wallet,

    /// The purchase receipt (freshly issued or previously stored).
    pub receipt: PurchaseReceipt,

    /// True when the payment had already been credited.
    pub already_processed: bool,
}

/// Handler for the purchase confirmation saga.
pub struct ConfirmPurchaseHandler {
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<dyn PackageCatalog>,
    receipts: Arc<dyn ReceiptStore>,
    ledger: Arc<dyn LedgerReader>,
    wallet: Arc<ResourceWalletService>,
    notifier: Arc<dyn ReceiptNotifier>,
    clock: Arc<dyn Clock>,
}

impl ConfirmPurchaseHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        catalog: Arc<dyn PackageCatalog>,
        receipts: Arc<dyn ReceiptStore>,
        ledger: Arc<dyn LedgerReader>,
        wallet: Arc<ResourceWalletService>,
        notifier: Arc<dyn ReceiptNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            receipts,
            ledger,
            wallet,
            notifier,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPurchaseCommand,
    ) -> Result<ConfirmPurchaseResult, DomainError> {
        // 1. The gateway is the oracle of truth for "did money move". This
        //    call strictly precedes any wallet mutation.
        let payment = self
            .gateway
            .retrieve_payment(&cmd.payment_reference)
            .await
            .map_err(DomainError::from)?;

        if !payment.status.is_successful() {
            return Err(DomainError::new(
                ErrorCode::PaymentNotCompleted,
                "Payment has not completed",
            )
            .with_detail("payment_reference", &cmd.payment_reference));
        }

        // The payment must belong to the confirming user.
        if let Some(paying_user) = payment.user_id() {
            if paying_user != cmd.user_id {
                return Err(DomainError::new(
                    ErrorCode::AccessDenied,
                    "Payment belongs to a different user",
                ));
            }
        }

        // 2a. Replay guard: a stored receipt means the whole saga already
        //     completed for this reference.
        if let Some(receipt) = self
            .receipts
            .find_by_payment(&cmd.payment_reference)
            .await?
        {
            tracing::info!(
                payment_reference = %cmd.payment_reference,
                "Purchase already confirmed; returning stored receipt"
            );
            let wallet = self.wallet.get_or_create_wallet(&cmd.user_id).await?;
            return Ok(ConfirmPurchaseResult {
                transaction_ids: Vec::new(),
                wallet,
                receipt,
                already_processed: true,
            });
        }

        // 3. Resolve the package the payment was created for.
        let package_id = payment.package_id().ok_or_else(|| {
            DomainError::new(
                ErrorCode::PackageNotFound,
                "Payment metadata does not reference a package",
            )
        })?;
        let package = self
            .catalog
            .find_by_id(&package_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::PackageNotFound, "Package not found"))?;

        // 4. Refuse to credit resources for a tampered or stale price.
        if !package.matches_charge(payment.amount_cents, &payment.currency) {
            return Err(DomainError::new(
                ErrorCode::AmountMismatch,
                "Paid amount does not match the package price",
            )
            .with_detail("paid", payment.amount_cents.to_string())
            .with_detail("expected", package.price_cents.to_string()));
        }

        // 5. Credit unless a previous attempt already did: ledger entries
        //    linked to this payment mean the credit committed but the
        //    receipt step failed, so only the receipt is retried.
        let prior_entries = self.ledger.find_by_payment(&cmd.payment_reference).await?;
        let (wallet, transaction_ids) = if prior_entries.is_empty() {
            let credit = self
                .wallet
                .credit_bundle(
                    cmd.user_id,
                    package.resources,
                    TransactionType::Purchase,
                    Some(cmd.payment_reference.clone()),
                    format!("Purchased package {}", package.name),
                )
                .await;
            match credit {
                Ok(credit) => (credit.wallet, credit.transaction_ids),
                // A concurrent confirmation won the credit between our
                // ledger check and the insert; the store's uniqueness guard
                // kept it exactly-once. Resume at the receipt step.
                Err(err) if err.code == ErrorCode::DuplicatePaymentCredit => {
                    let wallet = self.wallet.get_or_create_wallet(&cmd.user_id).await?;
                    let entries = self.ledger.find_by_payment(&cmd.payment_reference).await?;
                    (wallet, entries.iter().map(|e| e.id).collect())
                }
                Err(err) => return Err(err),
            }
        } else {
            tracing::info!(
                payment_reference = %cmd.payment_reference,
                "Credit already applied; re-attempting receipt only"
            );
            let wallet = self.wallet.get_or_create_wallet(&cmd.user_id).await?;
            (wallet, prior_entries.iter().map(|e| e.id).collect())
        };

        // 6. Write-once receipt; on a lost race the stored receipt wins.
        let receipt = PurchaseReceipt::issue(
            cmd.user_id,
            cmd.payment_reference.clone(),
            &package,
            self.clock.now(),
        );
        let receipt = match self.receipts.save(&receipt).await? {
            ReceiptSaveResult::Inserted => receipt,
            ReceiptSaveResult::AlreadyExists => self
                .receipts
                .find_by_payment(&cmd.payment_reference)
                .await?
                .unwrap_or(receipt),
        };

        // 7. Money has moved and resources are credited; a failed
        //    confirmation email must not fail the purchase.
        if let Err(err) = self.notifier.send_purchase_confirmation(&receipt).await {
            tracing::warn!(
                payment_reference = %cmd.payment_reference,
                error = %err,
                "Purchase confirmation notification failed"
            );
        }

        tracing::info!(
            payment_reference = %cmd.payment_reference,
            user_id = %cmd.user_id,
            package = %package.name,
            "Confirmed package purchase"
        );

        Ok(ConfirmPurchaseResult {
            transaction_ids,
            wallet,
            receipt,
            already_processed: false,
        })
    }
}
