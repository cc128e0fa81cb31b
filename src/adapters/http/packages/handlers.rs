//! HTTP handlers for package and purchase endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::application::handlers::billing::{
    ConfirmPurchaseCommand, ConfirmPurchaseHandler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, ListPackagesHandler, StartPackagePurchaseCommand,
    StartPackagePurchaseHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode, PackageId};

use super::super::error::{domain_error_response, ErrorResponse};
use super::super::extract::AuthenticatedUser;
use super::dto::{
    CheckoutResponse, ConfirmPurchaseRequest, PackageResponse, PurchaseResponse, WebhookAck,
};

/// Shared state for package endpoints.
#[derive(Clone)]
pub struct PackageAppState {
    pub list_packages: Arc<ListPackagesHandler>,
    pub start_purchase: Arc<StartPackagePurchaseHandler>,
    pub confirm_purchase: Arc<ConfirmPurchaseHandler>,
    pub payment_webhook: Arc<HandlePaymentWebhookHandler>,
}

fn bad_request(message: &str) -> Response {
    let error = ErrorResponse::new("VALIDATION_FAILED", message);
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

/// `GET /api/packages`
pub async fn list_packages(State(state): State<PackageAppState>) -> Response {
    match state.list_packages.handle().await {
        Ok(packages) => {
            let body: Vec<PackageResponse> =
                packages.into_iter().map(PackageResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/packages/:id/checkout`
pub async fn start_package_purchase(
    State(state): State<PackageAppState>,
    user: AuthenticatedUser,
    Path(package_id): Path<String>,
) -> Response {
    let package_id: PackageId = match package_id.parse() {
        Ok(id) => id,
        Err(_) => return bad_request("package id must be a UUID"),
    };

    let cmd = StartPackagePurchaseCommand {
        user_id: user.user_id,
        package_id,
    };
    match state.start_purchase.handle(cmd).await {
        Ok(payment) => (
            StatusCode::OK,
            Json(CheckoutResponse {
                payment_id: payment.id,
                client_secret: payment.client_secret,
            }),
        )
            .into_response(),
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/packages/:id/purchase`
pub async fn confirm_purchase(
    State(state): State<PackageAppState>,
    user: AuthenticatedUser,
    Path(package_id): Path<String>,
    Json(request): Json<ConfirmPurchaseRequest>,
) -> Response {
    let package_id: PackageId = match package_id.parse() {
        Ok(id) => id,
        Err(_) => return bad_request("package id must be a UUID"),
    };

    let cmd = ConfirmPurchaseCommand {
        payment_reference: request.payment_intent_id,
        user_id: user.user_id,
    };
    match state.confirm_purchase.handle(cmd).await {
        Ok(result) => {
            // The payment's metadata is authoritative for which package was
            // bought; a mismatched path is a client error.
            if result.receipt.package_id != package_id {
                return domain_error_response(
                    DomainError::new(
                        ErrorCode::ValidationFailed,
                        "Payment was made for a different package",
                    )
                    .with_detail("package_id", result.receipt.package_id.to_string()),
                );
            }
            (StatusCode::OK, Json(PurchaseResponse::from(result))).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/webhooks/payments`
///
/// No user authentication: deliveries are verified by signature.
pub async fn handle_payment_webhook(
    State(state): State<PackageAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };
    match state.payment_webhook.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(err) => domain_error_response(err),
    }
}
