//! # Error Types
//!
//! Domain-specific error types for goonj-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  goonj-core errors (this file)                                         │
//! │  ├── CoreError        - Checkout / domain rule violations              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  goonj-db errors (separate crate)                                      │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  storefront errors (in app)                                            │
//! │  └── ApiError         - What the caller sees (code + message)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴──► ApiError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::checkout::CheckoutStep;
use crate::types::BookId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these are fatal: each one leaves the checkout session exactly as
/// it was before the refused operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A gated operation was attempted without a signed-in user.
    #[error("Sign-in required to continue checkout")]
    AuthenticationRequired,

    /// Checkout cannot start (or continue) with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The requested operation is not allowed from the current step.
    ///
    /// ## When This Occurs
    /// - Submitting an address after the order was already placed
    /// - Placing an order while still on the address step
    /// - Navigating back from the confirmation step
    #[error("Cannot {action} while checkout is at the {step} step")]
    InvalidTransition {
        step: CheckoutStep,
        action: &'static str,
    },

    /// A gateway payment for this checkout is still awaiting its callback.
    #[error("A payment for this checkout is already in progress")]
    PaymentInProgress,

    /// A book id that the catalog does not know about.
    #[error("Book not found in catalog: {0}")]
    UnknownBook(BookId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements. The
/// checkout recovers from them locally: the transition is refused and the
/// user is re-prompted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., phone number that is not 10 digits).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate book id in a catalog).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            step: CheckoutStep::Confirmation,
            action: "submit an address",
        };
        assert_eq!(
            err.to_string(),
            "Cannot submit an address while checkout is at the confirmation step"
        );
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("city").to_string(),
            "city is required"
        );
        assert_eq!(
            ValidationError::invalid_format("phone", "must be exactly 10 digits").to_string(),
            "phone has invalid format: must be exactly 10 digits"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("fullName").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
