//! ReconcileWalletHandler - ledger-vs-balance audit.
//!
//! A divergence here is a fatal data-integrity incident (the atomicity
//! contract was violated somewhere): it is surfaced for manual remediation,
//! never auto-repaired or retried.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::wallet::{ReconciliationReport, ResourceWalletService};

/// Handler for wallet reconciliation.
pub struct ReconcileWalletHandler {
    wallet: Arc<ResourceWalletService>,
}

impl ReconcileWalletHandler {
    pub fn new(wallet: Arc<ResourceWalletService>) -> Self {
        Self { wallet }
    }

    /// Audits one wallet; a mismatch returns `LEDGER_OUT_OF_BALANCE` with
    /// per-resource detail.
    pub async fn handle(&self, user_id: UserId) -> Result<ReconciliationReport, DomainError> {
        let report = self.wallet.reconcile_wallet(&user_id).await?;

        if !report.is_consistent() {
            let mut err = DomainError::new(
                ErrorCode::LedgerOutOfBalance,
                "Wallet balance diverged from its ledger",
            )
            .with_detail("user_id", user_id.to_string());
            for line in report.mismatches() {
                err = err.with_detail(
                    line.resource.as_str(),
                    format!("balance {} vs ledger {}", line.balance, line.ledger_sum),
                );
            }
            return Err(err);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWalletStore;
    use crate::domain::foundation::Timestamp;
    use crate::domain::wallet::{
        AddResourcesRequest, ResourceBundle, ResourceType, TransactionType, WalletPolicy,
    };
    use crate::ports::FixedClock;

    fn service(store: Arc<InMemoryWalletStore>) -> Arc<ResourceWalletService> {
        let clock = Arc::new(FixedClock::at(Timestamp::from_unix_secs(1_700_000_000)));
        Arc::new(ResourceWalletService::new(
            store.clone(),
            store,
            clock,
            WalletPolicy::default(),
        ))
    }

    #[tokio::test]
    async fn consistent_wallet_reconciles() {
        let store = Arc::new(InMemoryWalletStore::new());
        let svc = service(store);
        let handler = ReconcileWalletHandler::new(svc.clone());
        let user = UserId::new();

        svc.add_resources(AddResourcesRequest {
            user_id: user,
            resource_type: ResourceType::ProjectVoucher,
            amount: 4,
            transaction_type: TransactionType::Grant,
            description: None,
            project_id: None,
            payment_id: None,
        })
        .await
        .unwrap();

        let report = handler.handle(user).await.unwrap();
        assert!(report.is_consistent());
    }

    #[tokio::test]
    async fn divergence_is_a_fatal_integrity_error() {
        let store = Arc::new(InMemoryWalletStore::new());
        let user = UserId::new();
        // Balance with no ledger behind it: the invariant is broken.
        store.seed_balances(user, ResourceBundle::of(ResourceType::FacilitatorSeat, 3));

        let handler = ReconcileWalletHandler::new(service(store));
        let err = handler.handle(user).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::LedgerOutOfBalance);
        assert!(!err.is_retryable());
        assert!(err.details.contains_key("facilitator_seat"));
    }
}
