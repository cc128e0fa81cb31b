//! GetTransactionHistoryHandler - ledger history query.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::wallet::LedgerEntry;
use crate::ports::LedgerReader;

/// Default page size for history queries.
const DEFAULT_LIMIT: u32 = 50;

/// Query for a user's recent wallet transactions.
#[derive(Debug, Clone)]
pub struct GetTransactionHistoryQuery {
    pub user_id: UserId,
    pub limit: Option<u32>,
}

/// Handler for transaction history.
pub struct GetTransactionHistoryHandler {
    ledger: Arc<dyn LedgerReader>,
}

impl GetTransactionHistoryHandler {
    pub fn new(ledger: Arc<dyn LedgerReader>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        query: GetTransactionHistoryQuery,
    ) -> Result<Vec<LedgerEntry>, DomainError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(200);
        self.ledger.entries_for_user(&query.user_id, limit).await
    }
}
