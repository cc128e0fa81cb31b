//! HTTP handlers for wallet endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::application::handlers::wallet::{
    GetTransactionHistoryHandler, GetTransactionHistoryQuery, GetWalletHandler,
    GrantResourcesCommand, GrantResourcesHandler, ReconcileWalletHandler,
};
use crate::domain::foundation::UserId;

use super::super::error::{domain_error_response, ErrorResponse};
use super::super::extract::AuthenticatedUser;
use super::dto::{
    GrantResourcesRequest, HistoryParams, ReconciliationResponse, TransactionResponse,
    WalletResponse,
};

/// Shared state for wallet endpoints.
#[derive(Clone)]
pub struct WalletAppState {
    pub get_wallet: Arc<GetWalletHandler>,
    pub transaction_history: Arc<GetTransactionHistoryHandler>,
    pub grant_resources: Arc<GrantResourcesHandler>,
    pub reconcile_wallet: Arc<ReconcileWalletHandler>,
}

/// `GET /api/wallet`
pub async fn get_wallet(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
) -> Response {
    match state.get_wallet.handle(user.user_id).await {
        Ok(wallet) => (StatusCode::OK, Json(WalletResponse::from(wallet))).into_response(),
        Err(err) => domain_error_response(err),
    }
}

/// `GET /api/wallet/transactions`
pub async fn get_transaction_history(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
    Query(params): Query<HistoryParams>,
) -> Response {
    let query = GetTransactionHistoryQuery {
        user_id: user.user_id,
        limit: params.limit,
    };
    match state.transaction_history.handle(query).await {
        Ok(entries) => {
            let body: Vec<TransactionResponse> =
                entries.into_iter().map(TransactionResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/wallet/grant`
///
/// Admin-gated in production; admin authorization lives in middleware
/// outside this core.
pub async fn grant_resources(
    State(state): State<WalletAppState>,
    _admin: AuthenticatedUser,
    Json(request): Json<GrantResourcesRequest>,
) -> Response {
    let user_id: UserId = match request.user_id.parse() {
        Ok(id) => id,
        Err(_) => {
            let error = ErrorResponse::new("VALIDATION_FAILED", "user_id must be a UUID");
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    let cmd = GrantResourcesCommand {
        user_id,
        resource_type: request.resource_type,
        amount: request.amount,
        reason: request.reason,
    };
    match state.grant_resources.handle(cmd).await {
        Ok(operation) => {
            (StatusCode::OK, Json(WalletResponse::from(operation.wallet))).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}

/// `POST /api/wallet/reconcile`
pub async fn reconcile_wallet(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
) -> Response {
    match state.reconcile_wallet.handle(user.user_id).await {
        Ok(report) => {
            (StatusCode::OK, Json(ReconciliationResponse::from(report))).into_response()
        }
        Err(err) => domain_error_response(err),
    }
}
