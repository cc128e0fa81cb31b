//! Payment gateway port for external payment processing.
//!
//! Defines the contract for payment processor integrations (e.g. Stripe).
//! The core treats the gateway as the opaque oracle of truth for "did money
//! move": it retrieves payment state before any wallet mutation and never
//! holds a wallet lock across a gateway call.
//!
//! # Design
//!
//! - **Gateway agnostic**: interface works with any payment processor
//! - **Intent-based**: one payment intent per package purchase attempt
//! - **Idempotent**: retrieval is read-only; creation accepts retries

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorCode, PackageId, UserId};

/// Port for payment processor integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Retrieves a payment by its processor reference.
    async fn retrieve_payment(&self, reference: &str) -> Result<PaymentDetails, PaymentError>;

    /// Creates a payment intent for a package purchase.
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatedPayment, PaymentError>;

    /// Verifies a webhook signature and parses the event.
    ///
    /// Returns the parsed event if valid, an error if the signature is
    /// invalid or the payload malformed.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayWebhookEvent, PaymentError>;
}

/// Payment state as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Processor's payment reference.
    pub id: String,

    /// Current status.
    pub status: PaymentStatus,

    /// Amount in integer cents.
    pub amount_cents: i64,

    /// ISO currency code, lowercase.
    pub currency: String,

    /// Metadata attached at creation (`package_id`, `user_id`).
    pub metadata: HashMap<String, String>,
}

impl PaymentDetails {
    /// The package referenced by the payment's metadata, if present.
    pub fn package_id(&self) -> Option<PackageId> {
        self.metadata.get("package_id")?.parse().ok()
    }

    /// The purchasing user from the payment's metadata, if present.
    pub fn user_id(&self) -> Option<UserId> {
        self.metadata.get("user_id")?.parse().ok()
    }
}

/// Payment lifecycle status from the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Terminal success: money moved.
    Succeeded,

    /// Processor is still working on it.
    Processing,

    /// Awaiting a payment method from the customer.
    RequiresPaymentMethod,

    /// Awaiting confirmation.
    RequiresConfirmation,

    /// Terminal failure or cancellation.
    Canceled,

    /// Unknown status from the processor.
    Unknown,
}

impl PaymentStatus {
    /// Whether resources may be credited against this payment.
    pub fn is_successful(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded)
    }
}

/// Request to create a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePaymentRequest {
    /// Purchasing user (stored as metadata).
    pub user_id: UserId,

    /// Package being purchased (stored as metadata).
    pub package_id: PackageId,

    /// Amount in integer cents.
    pub amount_cents: i64,

    /// ISO currency code.
    pub currency: String,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// A created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPayment {
    /// Processor's payment reference.
    pub id: String,

    /// Client secret for completing payment on the client.
    pub client_secret: String,

    /// Initial status.
    pub status: PaymentStatus,
}

/// Webhook event from the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayWebhookEvent {
    /// Event id from the processor.
    pub id: String,

    /// Event classification.
    pub event_type: GatewayEventType,

    /// Payment reference the event concerns.
    pub payment_id: String,

    /// When the event occurred (Unix seconds).
    pub created_at: i64,
}

/// Webhook event types this core consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayEventType {
    /// Payment reached terminal success.
    PaymentSucceeded,

    /// Payment failed.
    PaymentFailed,

    /// Anything else; acknowledged and ignored.
    Unknown(String),
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Creates a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Network connectivity failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// API authentication failure.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Payment reference not found at the processor.
    pub fn not_found(reference: &str) -> Self {
        Self::new(
            PaymentErrorCode::NotFound,
            format!("Payment {} not found", reference),
        )
    }

    /// Invalid webhook payload or signature.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    /// Processor-side error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::NotFound => ErrorCode::PaymentNotCompleted,
            PaymentErrorCode::InvalidWebhook => ErrorCode::ValidationFailed,
            _ => ErrorCode::ExternalServiceError,
        };
        DomainError::new(code, err.message)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Payment reference not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature or payload.
    InvalidWebhook,

    /// Processor API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
