//! Billing domain - packages and purchase receipts.

mod package;
mod receipt;

pub use package::Package;
pub use receipt::PurchaseReceipt;
