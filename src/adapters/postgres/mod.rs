//! PostgreSQL adapters.
//!
//! Implementations of the storage ports over sqlx with connection pooling.
//! The wallet store is where the atomicity contract lives: balance update
//! and ledger append commit in one transaction under a row lock.

mod invitation_repository;
mod package_catalog;
mod project_store;
mod receipt_store;
mod user_directory;
mod wallet_store;

pub use invitation_repository::PostgresInvitationRepository;
pub use package_catalog::PostgresPackageCatalog;
pub use project_store::PostgresProjectStore;
pub use receipt_store::PostgresReceiptStore;
pub use user_directory::PostgresUserDirectory;
pub use wallet_store::PostgresWalletStore;
