//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for Stripe integration: payment
//! intent creation/retrieval and webhook signature verification.
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_payment_provider;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_provider::{MockPaymentGateway, MOCK_WEBHOOK_SIGNATURE};
pub use stripe_adapter::{StripeConfig, StripePaymentGateway};
pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripePaymentIntent, StripeWebhookEvent,
};
