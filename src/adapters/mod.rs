//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL storage (sqlx)
//! - `memory` - In-memory storage for tests and local development
//! - `stripe` - Stripe payment gateway + mock
//! - `notify` - Receipt notification sinks
//! - `http` - Axum HTTP surface

pub mod http;
pub mod memory;
pub mod notify;
pub mod postgres;
pub mod stripe;
