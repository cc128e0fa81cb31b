//! Wallet HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{TransactionResponse, WalletResponse};
pub use handlers::WalletAppState;
pub use routes::wallet_routes;
