//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be a positive amount, got {actual}")]
    NonPositiveAmount { field: String, actual: i64 },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a non-positive amount validation error.
    pub fn non_positive_amount(field: impl Into<String>, actual: i64) -> Self {
        ValidationError::NonPositiveAmount {
            field: field.into(),
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    // Wallet errors
    WalletNotFound,
    InsufficientResources,
    ResourceLimitExceeded,
    LedgerWriteFailed,
    ConcurrencyConflict,
    LedgerOutOfBalance,
    DuplicatePaymentCredit,

    // Invitation / role errors
    InvalidInvitation,
    InvitationNotFound,
    ProjectHasStoryteller,
    StorytellerElsewhere,
    AlreadyMember,
    UserExists,
    AccessDenied,

    // Purchase errors
    PaymentNotCompleted,
    PackageNotFound,
    AmountMismatch,

    // Not found errors
    ProjectNotFound,
    UserNotFound,

    // Infrastructure errors
    DatabaseError,
    ExternalServiceError,
    InternalError,
}

impl ErrorCode {
    /// Whether an operation failing with this code is safe to retry as-is.
    ///
    /// Race-lost and read-after-write conditions clear on their own; business
    /// rejections and integrity incidents do not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ConcurrencyConflict | ErrorCode::WalletNotFound
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::WalletNotFound => "WALLET_NOT_FOUND",
            ErrorCode::InsufficientResources => "INSUFFICIENT_RESOURCES",
            ErrorCode::ResourceLimitExceeded => "RESOURCE_LIMIT_EXCEEDED",
            ErrorCode::LedgerWriteFailed => "LEDGER_WRITE_FAILED",
            ErrorCode::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            ErrorCode::LedgerOutOfBalance => "LEDGER_OUT_OF_BALANCE",
            ErrorCode::DuplicatePaymentCredit => "DUPLICATE_PAYMENT_CREDIT",
            ErrorCode::InvalidInvitation => "INVALID_INVITATION",
            ErrorCode::InvitationNotFound => "INVITATION_NOT_FOUND",
            ErrorCode::ProjectHasStoryteller => "PROJECT_HAS_STORYTELLER",
            ErrorCode::StorytellerElsewhere => "STORYTELLER_ELSEWHERE",
            ErrorCode::AlreadyMember => "ALREADY_MEMBER",
            ErrorCode::UserExists => "USER_EXISTS",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::PaymentNotCompleted => "PAYMENT_NOT_COMPLETED",
            ErrorCode::PackageNotFound => "PACKAGE_NOT_FOUND",
            ErrorCode::AmountMismatch => "AMOUNT_MISMATCH",
            ErrorCode::ProjectNotFound => "PROJECT_NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Creates an insufficiency rejection carrying the actionable remedy:
    /// which resource fell short, how much was requested, how much remains.
    pub fn insufficient_resources(resource: &str, requested: i64, available: i64) -> Self {
        Self::new(
            ErrorCode::InsufficientResources,
            format!(
                "Insufficient {}: requested {}, available {}",
                resource, requested, available
            ),
        )
        .with_detail("resource", resource)
        .with_detail("requested", requested.to_string())
        .with_detail("available", available.to_string())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Whether this error is safe to retry without change.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
