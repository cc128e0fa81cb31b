//! GrantResourcesHandler - administrative resource credit.
//!
//! Grants bypass payment but not the audit trail: every grant lands in the
//! ledger with `transaction_type = grant` and the stated reason.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::wallet::{
    AddResourcesRequest, ResourceType, ResourceWalletService, TransactionType, WalletOperation,
};

/// Command to grant resources outside a purchase.
#[derive(Debug, Clone)]
pub struct GrantResourcesCommand {
    pub user_id: UserId,
    pub resource_type: ResourceType,
    pub amount: i64,
    pub reason: String,
}

/// Handler for administrative grants.
pub struct GrantResourcesHandler {
    wallet: Arc<ResourceWalletService>,
}

impl GrantResourcesHandler {
    pub fn new(wallet: Arc<ResourceWalletService>) -> Self {
        Self { wallet }
    }

    pub async fn handle(
        &self,
        cmd: GrantResourcesCommand,
    ) -> Result<WalletOperation, DomainError> {
        if cmd.reason.trim().is_empty() {
            return Err(DomainError::validation(
                "reason",
                "Grants must state a reason for the audit trail",
            ));
        }

        self.wallet
            .add_resources(AddResourcesRequest {
                user_id: cmd.user_id,
                resource_type: cmd.resource_type,
                amount: cmd.amount,
                transaction_type: TransactionType::Grant,
                description: Some(cmd.reason),
                project_id: None,
                payment_id: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWalletStore;
    use crate::domain::foundation::{ErrorCode, Timestamp};
    use crate::domain::wallet::WalletPolicy;
    use crate::ports::FixedClock;

    fn handler(store: Arc<InMemoryWalletStore>) -> GrantResourcesHandler {
        let clock = Arc::new(FixedClock::at(Timestamp::from_unix_secs(1_700_000_000)));
        GrantResourcesHandler::new(Arc::new(ResourceWalletService::new(
            store.clone(),
            store,
            clock,
            WalletPolicy::default(),
        )))
    }

    #[tokio::test]
    async fn grant_credits_and_audits_the_reason() {
        let store = Arc::new(InMemoryWalletStore::new());
        let h = handler(store.clone());
        let user = UserId::new();

        let operation = h
            .handle(GrantResourcesCommand {
                user_id: user,
                resource_type: ResourceType::StorytellerSeat,
                amount: 2,
                reason: "Support make-good for lost invitation".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(operation.wallet.storyteller_seats, 2);
        let entries = store.ledger_entries();
        assert_eq!(entries[0].transaction_type, TransactionType::Grant);
        assert!(entries[0].description.contains("make-good"));
    }

    #[tokio::test]
    async fn grant_requires_a_reason() {
        let h = handler(Arc::new(InMemoryWalletStore::new()));
        let err = h
            .handle(GrantResourcesCommand {
                user_id: UserId::new(),
                resource_type: ResourceType::ProjectVoucher,
                amount: 1,
                reason: "  ".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
