//! Axum router configuration for wallet endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    get_transaction_history, get_wallet, grant_resources, reconcile_wallet, WalletAppState,
};

/// Create the wallet API router.
///
/// # Routes
///
/// - `GET /` - Current user's wallet balances (get-or-create)
/// - `GET /transactions` - Recent ledger history
/// - `POST /grant` - Administrative resource grant
/// - `POST /reconcile` - Ledger-vs-balance audit
pub fn wallet_routes() -> Router<WalletAppState> {
    Router::new()
        .route("/", get(get_wallet))
        .route("/transactions", get(get_transaction_history))
        .route("/grant", post(grant_resources))
        .route("/reconcile", post(reconcile_wallet))
}
