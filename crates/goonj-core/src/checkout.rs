//! # Checkout Step Machine
//!
//! The pure half of the checkout workflow: which step the customer is on,
//! what they have entered so far, and which moves are legal from here.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Steps                                     │
//! │                                                                         │
//! │   ┌──────────┐  submit_address   ┌──────────┐  confirm   ┌────────────┐ │
//! │   │ Address  │ ────────────────► │ Payment  │ ─────────► │Confirmation│ │
//! │   └──────────┘                   └──────────┘            └────────────┘ │
//! │        ▲                              │                    (terminal)   │
//! │        └────── back_to_address ───────┘                                 │
//! │                                                                         │
//! │   select_payment: Payment → Payment (replaces the whole variant)        │
//! │   Anything else: CoreError::InvalidTransition, nothing changes          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order placement, the gateway round-trip and persistence live in the
//! storefront app; this module only decides whether a move is allowed.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::types::{Address, PaymentMethod, User};
use crate::validation::{validate_address, validate_payment_method};

// =============================================================================
// Checkout Step
// =============================================================================

/// Where a checkout session currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Collecting the delivery address.
    #[default]
    Address,
    /// Choosing how to pay; order placement happens from here.
    Payment,
    /// Order placed. Terminal for the session.
    Confirmation,
}

impl CheckoutStep {
    /// Returns the lowercase step name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Address => "address",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Confirmation => "confirmation",
        }
    }

    /// Refuses `action` unless the session is at `required`.
    pub fn require(self, required: CheckoutStep, action: &'static str) -> CoreResult<()> {
        if self == required {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { step: self, action })
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entry Gate
// =============================================================================

/// Checks the preconditions for starting a checkout.
///
/// ## Returns
/// The signed-in user on success.
///
/// ## Errors
/// - `CoreError::AuthenticationRequired` when nobody is signed in
/// - `CoreError::EmptyCart` when the cart has no lines
///
/// Identity is checked first so an anonymous visitor is sent to sign in
/// before being told anything about their cart.
pub fn check_entry<'a>(identity: Option<&'a User>, cart: &Cart) -> CoreResult<&'a User> {
    let user = identity.ok_or(CoreError::AuthenticationRequired)?;
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    Ok(user)
}

// =============================================================================
// Checkout Progress
// =============================================================================

/// The customer's progress through one checkout session.
///
/// Every method either applies its change completely or returns an error
/// and leaves the progress untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutProgress {
    step: CheckoutStep,
    address: Address,
    payment_method: PaymentMethod,
}

impl CheckoutProgress {
    /// Starts at the address step with cash on delivery preselected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The last accepted address (empty until one is submitted).
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    /// `Address → Payment`: accepts a complete, valid address.
    pub fn submit_address(&mut self, address: Address) -> CoreResult<()> {
        self.step.require(CheckoutStep::Address, "submit an address")?;
        validate_address(&address)?;
        self.address = address;
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// `Payment → Address`: explicit back-navigation. The address is kept
    /// so it can be edited.
    pub fn back_to_address(&mut self) -> CoreResult<()> {
        self.step.require(CheckoutStep::Payment, "go back to the address step")?;
        self.step = CheckoutStep::Address;
        Ok(())
    }

    /// Replaces the active payment method. Details of the previous variant
    /// are discarded, never merged.
    pub fn select_payment(&mut self, method: PaymentMethod) -> CoreResult<()> {
        self.step.require(CheckoutStep::Payment, "change the payment method")?;
        self.payment_method = method;
        Ok(())
    }

    /// Checks that an order may be placed right now: the session is at the
    /// payment step and the selected method passes its own validity rule.
    pub fn ready_for_placement(&self) -> CoreResult<()> {
        self.step.require(CheckoutStep::Payment, "place an order")?;
        validate_payment_method(&self.payment_method)?;
        Ok(())
    }

    /// `Payment → Confirmation`. Call only after the order is persisted.
    pub fn confirm(&mut self) -> CoreResult<()> {
        self.step.require(CheckoutStep::Payment, "confirm an order")?;
        self.step = CheckoutStep::Confirmation;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::Book;

    fn address() -> Address {
        Address {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            house_number: "12B".to_string(),
            street_name: "MG Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            pincode: "411001".to_string(),
        }
    }

    fn user() -> User {
        User {
            uid: "u-1".to_string(),
            email: "asha@example.com".to_string(),
            display_name: "Asha".to_string(),
            photo_url: None,
        }
    }

    fn book() -> Book {
        Book {
            id: 1,
            title: "Godan".to_string(),
            author: "Premchand".to_string(),
            category: "Fiction".to_string(),
            price_cents: 20000,
            pages: 312,
            language: "Hindi".to_string(),
            description: String::new(),
            image: String::new(),
            isbn: "9788126705795".to_string(),
        }
    }

    #[test]
    fn test_entry_requires_identity_then_items() {
        let empty = Cart::new();
        let filled = Cart::new().reduce(crate::cart::CartAction::Add(book()));
        let who = user();

        assert!(matches!(
            check_entry(None, &filled),
            Err(CoreError::AuthenticationRequired)
        ));
        assert!(matches!(
            check_entry(Some(&who), &empty),
            Err(CoreError::EmptyCart)
        ));
        assert_eq!(check_entry(Some(&who), &filled).unwrap().uid, "u-1");
    }

    #[test]
    fn test_valid_address_advances_to_payment() {
        let mut progress = CheckoutProgress::new();
        progress.submit_address(address()).unwrap();
        assert_eq!(progress.step(), CheckoutStep::Payment);
        assert_eq!(progress.address().city, "Pune");
    }

    #[test]
    fn test_invalid_address_leaves_progress_unchanged() {
        let mut progress = CheckoutProgress::new();
        let before = progress.clone();

        let mut bad = address();
        bad.phone = "98765".to_string();
        assert!(progress.submit_address(bad).is_err());
        assert_eq!(progress, before);

        let mut blank = address();
        blank.street_name = "   ".to_string();
        let err = progress.submit_address(blank).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
        assert_eq!(progress.step(), CheckoutStep::Address);
    }

    #[test]
    fn test_back_navigation_only_from_payment() {
        let mut progress = CheckoutProgress::new();
        assert!(progress.back_to_address().is_err());

        progress.submit_address(address()).unwrap();
        progress.back_to_address().unwrap();
        assert_eq!(progress.step(), CheckoutStep::Address);
        assert_eq!(progress.address().full_name, "Asha Rao");
    }

    #[test]
    fn test_switching_payment_discards_previous_details() {
        let mut progress = CheckoutProgress::new();
        progress.submit_address(address()).unwrap();
        progress
            .select_payment(PaymentMethod::Upi {
                upi_id: "asha@upi".to_string(),
            })
            .unwrap();
        progress.select_payment(PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(progress.payment_method(), &PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn test_placement_checks_method_validity() {
        let mut progress = CheckoutProgress::new();
        progress.submit_address(address()).unwrap();
        progress
            .select_payment(PaymentMethod::Upi {
                upi_id: String::new(),
            })
            .unwrap();
        assert!(progress.ready_for_placement().is_err());

        progress.select_payment(PaymentMethod::GatewayRedirect).unwrap();
        assert!(progress.ready_for_placement().is_ok());
    }

    #[test]
    fn test_confirmation_is_terminal() {
        let mut progress = CheckoutProgress::new();
        progress.submit_address(address()).unwrap();
        progress.confirm().unwrap();
        assert_eq!(progress.step(), CheckoutStep::Confirmation);

        assert!(matches!(
            progress.submit_address(address()),
            Err(CoreError::InvalidTransition {
                step: CheckoutStep::Confirmation,
                ..
            })
        ));
        assert!(progress.back_to_address().is_err());
        assert!(progress.select_payment(PaymentMethod::CashOnDelivery).is_err());
        assert!(progress.ready_for_placement().is_err());
        assert_eq!(progress.step(), CheckoutStep::Confirmation);
    }

    #[test]
    fn test_step_display_is_lowercase() {
        assert_eq!(CheckoutStep::Payment.to_string(), "payment");
    }
}
