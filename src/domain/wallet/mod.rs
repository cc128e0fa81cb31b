//! Wallet domain - balances, ledger, and the resource wallet service.

mod balance;
mod ledger;
mod resource;
mod service;

pub use balance::Wallet;
pub use ledger::{LedgerEntry, WalletMutation};
pub use resource::{ResourceBundle, ResourceType, TransactionType};
pub use service::{
    AddResourcesRequest, BundleCredit, ConsumeResourcesRequest, ReconciliationLine,
    ReconciliationReport, ResourceWalletService, WalletOperation, WalletPolicy,
};
