//! HTTP DTOs for wallet endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::wallet::{
    LedgerEntry, ReconciliationReport, ResourceType, Wallet,
};

/// Wallet balances as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct WalletResponse {
    pub user_id: String,
    pub project_vouchers: i64,
    pub facilitator_seats: i64,
    pub storyteller_seats: i64,
    /// Last mutation time (ISO 8601).
    pub updated_at: String,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            user_id: wallet.user_id.to_string(),
            project_vouchers: wallet.project_vouchers,
            facilitator_seats: wallet.facilitator_seats,
            storyteller_seats: wallet.storyteller_seats,
            updated_at: wallet.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// One ledger entry in a history response.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub transaction_type: String,
    pub resource_type: String,
    pub amount: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub created_at: String,
}

impl From<LedgerEntry> for TransactionResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            transaction_type: entry.transaction_type.as_str().to_string(),
            resource_type: entry.resource_type.as_str().to_string(),
            amount: entry.amount,
            description: entry.description,
            project_id: entry.project_id.map(|p| p.to_string()),
            payment_id: entry.payment_id,
            created_at: entry.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Query parameters for the history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Request to grant resources administratively.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantResourcesRequest {
    pub user_id: String,
    pub resource_type: ResourceType,
    pub amount: i64,
    pub reason: String,
}

/// One line of a reconciliation response.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationLineResponse {
    pub resource: String,
    pub balance: i64,
    pub ledger_sum: i64,
    pub consistent: bool,
}

/// Reconciliation audit response.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResponse {
    pub user_id: String,
    pub consistent: bool,
    pub lines: Vec<ReconciliationLineResponse>,
}

impl From<ReconciliationReport> for ReconciliationResponse {
    fn from(report: ReconciliationReport) -> Self {
        Self {
            user_id: report.user_id.to_string(),
            consistent: report.is_consistent(),
            lines: report
                .lines
                .iter()
                .map(|line| ReconciliationLineResponse {
                    resource: line.resource.as_str().to_string(),
                    balance: line.balance,
                    ledger_sum: line.ledger_sum,
                    consistent: line.is_consistent(),
                })
                .collect(),
        }
    }
}
