//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floating point prices:                                            │
//! │    299.0 * 0.5 * 3 = 448.49999999999994  ❌ WRONG!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise for INR)                      │
//! │    29900 paise × 3 = 89700, markdown 50% = 44850 paise = ₹448.50       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use goonj_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_cents(29900); // ₹299.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // ₹598.00
//! let total = price + Money::from_cents(500);    // ₹304.00
//! assert_eq!(doubled.cents(), 59800);
//! assert_eq!(total.cents(), 30400);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Symbol used by the `Display` implementation.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Subtraction never panics on underflow of an unsigned type
/// - **Saturating arithmetic**: Overflow pins to the bound instead of wrapping
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// Book.price_cents ──► CartLine.line_total (after markdown) ──► Cart.total
///                                                                  │
///                                                                  ▼
///                                        Order.total_cents (frozen at placement)
///                                                                  │
///                                                                  ▼
///                                        SessionRequest.amount (gateway)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    ///
    /// ## Example
    /// ```rust
    /// use goonj_core::money::Money;
    ///
    /// let price = Money::from_cents(29900); // ₹299.00
    /// assert_eq!(price.cents(), 29900);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (rupees and paise).
    ///
    /// ## Example
    /// ```rust
    /// use goonj_core::money::Money;
    ///
    /// let price = Money::from_major_minor(199, 50); // ₹199.50
    /// assert_eq!(price.cents(), 19950);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in the smallest currency unit.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use goonj_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(29900);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 89700);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Applies a percentage markdown and returns the reduced amount.
    ///
    /// ## Arguments
    /// * `markdown_bps` - Markdown in basis points (5000 = 50%)
    ///
    /// ## Rounding
    /// The markdown amount is rounded half-up to the minor unit:
    /// `(amount * bps + 5000) / 10000`. The remaining amount is what the
    /// customer pays, so an odd paisa always rounds in the customer's favour.
    ///
    /// ## Example
    /// ```rust
    /// use goonj_core::money::Money;
    ///
    /// let list = Money::from_cents(20000); // ₹200.00
    /// assert_eq!(list.apply_markdown(5000).cents(), 10000); // ₹100.00
    ///
    /// let odd = Money::from_cents(19999);
    /// assert_eq!(odd.apply_markdown(5000).cents(), 9999);
    /// ```
    pub fn apply_markdown(&self, markdown_bps: u32) -> Money {
        // i128 keeps large order totals from overflowing mid-calculation
        let markdown = (self.0 as i128 * markdown_bps as i128 + 5000) / 10000;
        Money::from_cents(self.0 - markdown as i64)
    }

    /// Formats the amount with an explicit currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use goonj_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(44850).display_with("Rs. "), "Rs. 448.50");
    /// ```
    pub fn display_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, symbol, self.major().abs(), self.minor())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with(DEFAULT_CURRENCY_SYMBOL))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Summing line totals into a cart total.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
