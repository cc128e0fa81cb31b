//! HTTP DTOs for package and purchase endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::ConfirmPurchaseResult;
use crate::domain::billing::{Package, PurchaseReceipt};
use crate::domain::wallet::ResourceBundle;

use super::super::wallet::WalletResponse;

/// A purchasable package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub currency: String,
    pub resources: ResourceBundle,
}

impl From<Package> for PackageResponse {
    fn from(package: Package) -> Self {
        Self {
            id: package.id.to_string(),
            name: package.name,
            price_cents: package.price_cents,
            currency: package.currency,
            resources: package.resources,
        }
    }
}

/// Response for a started checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub payment_id: String,
    pub client_secret: String,
}

/// Request to confirm a purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPurchaseRequest {
    pub payment_intent_id: String,
}

/// A purchase receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptResponse {
    pub receipt_id: String,
    pub payment_intent_id: String,
    pub package_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub resources: ResourceBundle,
    /// Purchase completion time (ISO 8601).
    pub purchase_date: String,
}

impl From<PurchaseReceipt> for ReceiptResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        Self {
            receipt_id: receipt.receipt_id.to_string(),
            payment_intent_id: receipt.payment_intent_id,
            package_id: receipt.package_id.to_string(),
            amount_cents: receipt.amount_cents,
            currency: receipt.currency,
            resources: receipt.resources,
            purchase_date: receipt.purchase_date.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for a confirmed purchase.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub transaction_ids: Vec<String>,
    pub wallet_balance: WalletResponse,
    pub receipt: ReceiptResponse,
    pub already_processed: bool,
}

impl From<ConfirmPurchaseResult> for PurchaseResponse {
    fn from(result: ConfirmPurchaseResult) -> Self {
        Self {
            transaction_ids: result
                .transaction_ids
                .iter()
                .map(|id| id.to_string())
                .collect(),
            wallet_balance: WalletResponse::from(result.wallet),
            receipt: ReceiptResponse::from(result.receipt),
            already_processed: result.already_processed,
        }
    }
}

/// Acknowledgement body for webhook deliveries.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}
