//! Billing use-case handlers: catalog, checkout, and the purchase saga.

mod confirm_purchase;
mod handle_payment_webhook;
mod list_packages;
mod start_package_purchase;

pub use confirm_purchase::{
    ConfirmPurchaseCommand, ConfirmPurchaseHandler, ConfirmPurchaseResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
};
pub use list_packages::ListPackagesHandler;
pub use start_package_purchase::{StartPackagePurchaseCommand, StartPackagePurchaseHandler};
