//! Axum router configuration for package and webhook endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    confirm_purchase, handle_payment_webhook, list_packages, start_package_purchase,
    PackageAppState,
};

/// Create the package API router.
///
/// # Routes
///
/// - `GET /` - Active package catalog
/// - `POST /:id/checkout` - Create a payment intent for a package
/// - `POST /:id/purchase` - Confirm a completed payment and credit the
///   wallet (idempotent per payment reference)
pub fn package_routes() -> Router<PackageAppState> {
    Router::new()
        .route("/", get(list_packages))
        .route("/:id/checkout", post(start_package_purchase))
        .route("/:id/purchase", post(confirm_purchase))
}

/// Create the payment webhook router.
///
/// Separate from the package routes because webhooks carry no user
/// authentication; they are verified via signature.
///
/// # Routes
/// - `POST /payments` - Handle payment processor webhooks
pub fn webhook_routes() -> Router<PackageAppState> {
    Router::new().route("/payments", post(handle_payment_webhook))
}
