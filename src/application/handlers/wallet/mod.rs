//! Wallet use-case handlers.

mod get_transaction_history;
mod get_wallet;
mod grant_resources;
mod reconcile_wallet;

pub use get_transaction_history::{GetTransactionHistoryHandler, GetTransactionHistoryQuery};
pub use get_wallet::GetWalletHandler;
pub use grant_resources::{GrantResourcesCommand, GrantResourcesHandler};
pub use reconcile_wallet::ReconcileWalletHandler;
