//! # API Error Type
//!
//! Unified error type for every storefront operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  ValidationError ─► CoreError ──────────┐                              │
//! │                                          │                              │
//! │  DbError ───────────────────────────────┼──► ApiError { code, message } │
//! │                                          │         │                    │
//! │  GatewayError / ConfigError / Catalog ──┘         ▼                    │
//! │                                            CLI prints it; a UI would   │
//! │                                            re-render from `code`       │
//! │                                                                         │
//! │  None of these end the process. A refused checkout step leaves the     │
//! │  session exactly where it was.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::error;

use goonj_core::CoreError;
use goonj_db::DbError;

use crate::catalog::CatalogError;
use crate::checkout::GatewayError;
use crate::config::ConfigError;

/// Error returned from storefront operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PERSISTENCE_ERROR",
///   "message": "Could not save your order. Your cart is intact, please retry."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed address or payment input; re-prompt
    ValidationError,

    /// No signed-in user at a gated step; trigger sign-in
    AuthenticationRequired,

    /// Checkout started or placed with nothing in the cart
    EmptyCart,

    /// Operation not allowed from the current checkout step
    InvalidState,

    /// A gateway payment for this checkout has not answered yet
    PaymentInProgress,

    /// The gateway declined or could not be reached
    PaymentFailure,

    /// The order store failed; the attempt can be retried
    PersistenceError,

    /// Order (or book) does not exist
    NotFound,

    /// Caller is signed in but not an operator
    Forbidden,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a payment failure.
    pub fn payment_failure(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PaymentFailure, message)
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Whether the same call may succeed if simply repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::PersistenceError | ErrorCode::PaymentFailure
        )
    }
}

/// Converts database errors to API errors.
///
/// Only `NotFound` keeps its identity; every storage failure becomes a
/// retryable `PersistenceError` and the detail goes to the log.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            other => {
                error!(error = %other, "Order store operation failed");
                ApiError::new(
                    ErrorCode::PersistenceError,
                    "Could not reach the order store. Nothing was lost, please retry.",
                )
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::AuthenticationRequired => {
                ApiError::new(ErrorCode::AuthenticationRequired, message)
            }
            CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, message),
            CoreError::InvalidTransition { .. } => ApiError::new(ErrorCode::InvalidState, message),
            CoreError::PaymentInProgress => ApiError::new(ErrorCode::PaymentInProgress, message),
            CoreError::UnknownBook(id) => ApiError::not_found("Book", &id.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::payment_failure(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use goonj_core::{CheckoutStep, ValidationError};

    #[test]
    fn test_db_not_found_stays_not_found() {
        let err: ApiError = DbError::not_found("Order", "o-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: o-1");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_storage_failures_are_retryable() {
        let err: ApiError = DbError::ConnectionFailed("Pool is closed".into()).into();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_core_error_codes() {
        let cases = [
            (CoreError::AuthenticationRequired, ErrorCode::AuthenticationRequired),
            (CoreError::EmptyCart, ErrorCode::EmptyCart),
            (CoreError::PaymentInProgress, ErrorCode::PaymentInProgress),
            (
                CoreError::InvalidTransition {
                    step: CheckoutStep::Address,
                    action: "place an order",
                },
                ErrorCode::InvalidState,
            ),
            (
                CoreError::Validation(ValidationError::required("city")),
                ErrorCode::ValidationError,
            ),
            (CoreError::UnknownBook(9), ErrorCode::NotFound),
        ];
        for (core, code) in cases {
            assert_eq!(ApiError::from(core).code, code);
        }
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::forbidden("Operators only")).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "Operators only");
    }
}
