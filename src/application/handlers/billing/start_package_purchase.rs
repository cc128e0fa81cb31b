//! StartPackagePurchaseHandler - creates a payment intent for a package.
//!
//! Pricing authority lives server-side: the intent amount always comes from
//! the catalog, never from the client. The wallet is untouched until the
//! payment is confirmed.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, PackageId, UserId};
use crate::ports::{CreatePaymentRequest, CreatedPayment, PackageCatalog, PaymentGateway};

/// Command to start a package checkout.
#[derive(Debug, Clone)]
pub struct StartPackagePurchaseCommand {
    pub user_id: UserId,
    pub package_id: PackageId,
}

/// Handler for starting a package purchase.
pub struct StartPackagePurchaseHandler {
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<dyn PackageCatalog>,
}

impl StartPackagePurchaseHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, catalog: Arc<dyn PackageCatalog>) -> Self {
        Self { gateway, catalog }
    }

    pub async fn handle(
        &self,
        cmd: StartPackagePurchaseCommand,
    ) -> Result<CreatedPayment, DomainError> {
        let package = self
            .catalog
            .find_by_id(&cmd.package_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::PackageNotFound, "Package not found"))?;

        if !package.is_active {
            return Err(DomainError::new(
                ErrorCode::PackageNotFound,
                "Package is no longer for sale",
            ));
        }

        let payment = self
            .gateway
            .create_payment(CreatePaymentRequest {
                user_id: cmd.user_id,
                package_id: package.id,
                amount_cents: package.price_cents,
                currency: package.currency.clone(),
                idempotency_key: Some(format!("purchase-{}-{}", cmd.user_id, package.id)),
            })
            .await
            .map_err(DomainError::from)?;

        tracing::info!(
            user_id = %cmd.user_id,
            package = %package.name,
            payment_id = %payment.id,
            "Started package purchase"
        );

        Ok(payment)
    }
}
