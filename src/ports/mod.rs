//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Wallet Ports
//!
//! - `WalletStore` - Atomic balance + ledger persistence
//! - `LedgerReader` - History, payment-linkage, and reconciliation queries
//!
//! ## Collaborator Ports
//!
//! - `InvitationRepository` - Invitation persistence
//! - `ProjectStore` - Projects, roles, subscriptions
//! - `UserDirectory` - Account resolution/creation for acceptance
//! - `PackageCatalog` - Purchasable packages
//! - `ReceiptStore` - Write-once purchase receipts
//! - `PaymentGateway` - External payment processor
//! - `ReceiptNotifier` - Fire-and-forget purchase confirmations
//! - `Clock` - Injected time source for expiry logic

mod clock;
mod invitation_repository;
mod ledger_reader;
mod notification;
mod package_catalog;
mod payment_gateway;
mod project_store;
mod receipt_store;
mod user_directory;
mod wallet_store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use invitation_repository::InvitationRepository;
pub use ledger_reader::LedgerReader;
pub use notification::ReceiptNotifier;
pub use package_catalog::PackageCatalog;
pub use payment_gateway::{
    CreatePaymentRequest, CreatedPayment, GatewayEventType, GatewayWebhookEvent, PaymentDetails,
    PaymentError, PaymentErrorCode, PaymentGateway, PaymentStatus,
};
pub use project_store::ProjectStore;
pub use receipt_store::{ReceiptSaveResult, ReceiptStore};
pub use user_directory::{NewUser, UserAccount, UserDirectory};
pub use wallet_store::WalletStore;
