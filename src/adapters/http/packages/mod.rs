//! Package and purchase HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{PackageResponse, PurchaseResponse, ReceiptResponse};
pub use handlers::PackageAppState;
pub use routes::{package_routes, webhook_routes};
