//! HTTP adapters - REST API implementations.
//!
//! Each domain area has its own HTTP adapter for endpoint exposure; error
//! mapping and request extractors are shared.

pub mod error;
pub mod extract;
pub mod invitations;
pub mod packages;
pub mod projects;
pub mod wallet;

// Re-export key types for convenience
pub use invitations::{invitation_routes, InvitationAppState};
pub use packages::{package_routes, webhook_routes, PackageAppState};
pub use projects::{project_routes, ProjectAppState};
pub use wallet::{wallet_routes, WalletAppState};
