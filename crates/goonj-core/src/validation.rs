//! # Validation Module
//!
//! Input validation for checkout forms and catalog records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Shape: every Address field present, PaymentMethod tag known       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Address: all fields non-blank, phone exactly 10 digits            │
//! │  ├── PaymentMethod: per-variant detail checks                          │
//! │  └── Book: positive price, title present                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK constraints on the orders table                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use goonj_core::validation::validate_phone;
//!
//! assert!(validate_phone("9876543210").is_ok());
//! assert!(validate_phone("98765 43210").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Address, Book, PaymentMethod};
use crate::PHONE_DIGITS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Helpers
// =============================================================================

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// =============================================================================
// Address
// =============================================================================

/// Validates a phone number.
///
/// ## Rules
/// - Exactly 10 characters
/// - ASCII digits only (no spaces, no `+91` prefix)
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    require("phone", phone)?;

    if phone.len() != PHONE_DIGITS || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "phone",
            format!("must be exactly {} digits", PHONE_DIGITS),
        ));
    }

    Ok(())
}

/// Validates a delivery address.
///
/// ## Rules
/// - Every field must be non-empty after trimming
/// - Phone must pass [`validate_phone`]
///
/// The first failing field is reported, in form order.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Checkout: Address step                                                 │
/// │                                                                         │
/// │  Customer presses "Continue"                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_address(&address) ← THIS FUNCTION                            │
/// │       │                                                                 │
/// │       ├── blank field? → Error: "{field} is required"                  │
/// │       ├── bad phone?   → Error: "phone has invalid format: ..."        │
/// │       └── OK → step becomes Payment                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_address(address: &Address) -> ValidationResult<()> {
    for (field, value) in address.fields() {
        require(field, value)?;
    }
    validate_phone(&address.phone)
}

// =============================================================================
// Payment Method
// =============================================================================

/// Validates the details carried by the selected payment method.
///
/// Cash on delivery and the gateway redirect carry nothing and always pass.
pub fn validate_payment_method(method: &PaymentMethod) -> ValidationResult<()> {
    match method {
        PaymentMethod::CashOnDelivery | PaymentMethod::GatewayRedirect => Ok(()),
        PaymentMethod::Upi { upi_id } => require("upiId", upi_id),
        PaymentMethod::Card {
            card_number,
            expiry_date,
            cvv,
        } => {
            require("cardNumber", card_number)?;
            require("expiryDate", expiry_date)?;
            require("cvv", cvv)
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Validates a book record supplied by the catalog.
pub fn validate_book(book: &Book) -> ValidationResult<()> {
    require("title", &book.title)?;

    if book.price_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_address() -> Address {
        Address {
            full_name: "Ravi Kumar".to_string(),
            phone: "9123456780".to_string(),
            house_number: "4".to_string(),
            street_name: "Park Street".to_string(),
            city: "Kolkata".to_string(),
            state: "West Bengal".to_string(),
            pincode: "700016".to_string(),
        }
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9123456780").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("912345678").is_err());
        assert!(validate_phone("91234567801").is_err());
        assert!(validate_phone("91234-6780").is_err());
        // ten characters but not ASCII digits
        assert!(validate_phone("९१२३४५६७८०").is_err());
    }

    #[test]
    fn test_validate_address_accepts_complete_form() {
        assert!(validate_address(&valid_address()).is_ok());
    }

    #[test]
    fn test_validate_address_reports_each_blank_field() {
        let blanks: [fn(&mut Address); 7] = [
            |a| a.full_name.clear(),
            |a| a.phone.clear(),
            |a| a.house_number.clear(),
            |a| a.street_name = "  ".to_string(),
            |a| a.city.clear(),
            |a| a.state.clear(),
            |a| a.pincode.clear(),
        ];

        for blank in blanks {
            let mut address = valid_address();
            blank(&mut address);
            assert!(matches!(
                validate_address(&address),
                Err(ValidationError::Required { .. })
            ));
        }
    }

    #[test]
    fn test_validate_address_names_the_field() {
        let mut address = valid_address();
        address.house_number.clear();
        assert_eq!(
            validate_address(&address).unwrap_err(),
            ValidationError::required("houseNumber")
        );
    }

    #[test]
    fn test_validate_payment_method() {
        assert!(validate_payment_method(&PaymentMethod::CashOnDelivery).is_ok());
        assert!(validate_payment_method(&PaymentMethod::GatewayRedirect).is_ok());
        assert!(validate_payment_method(&PaymentMethod::Upi {
            upi_id: "ravi@okbank".to_string()
        })
        .is_ok());
        assert!(validate_payment_method(&PaymentMethod::Upi {
            upi_id: " ".to_string()
        })
        .is_err());

        let card = |number: &str, expiry: &str, cvv: &str| PaymentMethod::Card {
            card_number: number.to_string(),
            expiry_date: expiry.to_string(),
            cvv: cvv.to_string(),
        };
        assert!(validate_payment_method(&card("4111111111111111", "01/30", "123")).is_ok());
        assert!(validate_payment_method(&card("", "01/30", "123")).is_err());
        assert!(validate_payment_method(&card("4111111111111111", "", "123")).is_err());
        assert!(validate_payment_method(&card("4111111111111111", "01/30", "")).is_err());
    }
}
