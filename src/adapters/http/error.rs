//! Error mapping between the domain and HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,

    /// Human-readable error message.
    pub message: String,

    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Stable HTTP status for each error category.
///
/// Business rejections are 4xx with their stable code; race losses that
/// survived the bounded internal retry surface as 503; upstream payment
/// processor trouble is 502; integrity incidents are 500.
fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::InvalidFormat
        | ErrorCode::InsufficientResources
        | ErrorCode::ResourceLimitExceeded
        | ErrorCode::InvalidInvitation
        | ErrorCode::ProjectHasStoryteller
        | ErrorCode::StorytellerElsewhere
        | ErrorCode::AlreadyMember
        | ErrorCode::PaymentNotCompleted
        | ErrorCode::AmountMismatch => StatusCode::BAD_REQUEST,

        ErrorCode::AccessDenied => StatusCode::FORBIDDEN,
        ErrorCode::UserExists | ErrorCode::DuplicatePaymentCredit => StatusCode::CONFLICT,

        ErrorCode::WalletNotFound
        | ErrorCode::InvitationNotFound
        | ErrorCode::PackageNotFound
        | ErrorCode::ProjectNotFound
        | ErrorCode::UserNotFound => StatusCode::NOT_FOUND,

        ErrorCode::ConcurrencyConflict => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ExternalServiceError => StatusCode::BAD_GATEWAY,

        ErrorCode::LedgerWriteFailed
        | ErrorCode::LedgerOutOfBalance
        | ErrorCode::DatabaseError
        | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Renders a domain error as a structured HTTP response.
pub fn domain_error_response(err: DomainError) -> Response {
    let status = status_for(err.code);

    if status.is_server_error() {
        tracing::error!(code = %err.code, message = %err.message, "Request failed");
    }

    let details = if err.details.is_empty() {
        None
    } else {
        serde_json::to_value(&err.details).ok()
    };

    let body = ErrorResponse {
        error_code: err.code.to_string(),
        message: err.message,
        details,
    };
    (status, Json(body)).into_response()
}
