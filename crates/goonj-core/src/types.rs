//! # Domain Types
//!
//! Core domain types used throughout the Goonj storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │      Order      │   │  PaymentMethod  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (integer)   │   │  id (UUID)      │   │  cod            │       │
//! │  │  title, author  │   │  user_id        │   │  razorpay       │       │
//! │  │  price_cents    │   │  items snapshot │   │  upi { upiId }  │       │
//! │  │  (catalog owns) │   │  total (frozen) │   │  card { .. }    │       │
//! │  └─────────────────┘   │  status         │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Address     │   │   OrderStatus   │       │
//! │  │  uid, email     │   │  7 required     │   │  pending        │       │
//! │  │  display_name   │   │  fields         │   │  confirmed ...  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An [`Order`] copies its lines, total, address and payment method at
//! placement time. Later cart mutations or catalog price changes never reach
//! a placed order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Book
// =============================================================================

/// Catalog identifier of a book.
pub type BookId = i64;

/// A book record supplied by the catalog. Immutable from the core's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique catalog identifier.
    #[ts(type = "number")]
    pub id: BookId,

    pub title: String,
    pub author: String,
    pub category: String,

    /// List price in the smallest currency unit (before the storewide markdown).
    #[ts(type = "number")]
    pub price_cents: i64,

    pub pages: u32,
    pub language: String,
    pub description: String,

    /// Cover image reference (URL or asset path).
    pub image: String,

    pub isbn: String,
}

impl Book {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// User
// =============================================================================

/// An authenticated identity, as issued by the identity provider.
///
/// The core never authenticates anyone; it only branches on whether a
/// `User` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

// =============================================================================
// Address
// =============================================================================

/// Delivery address captured at the first checkout step.
///
/// All fields are required; `phone` must be exactly 10 digits.
/// See [`crate::validation::validate_address`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    /// House / unit identifier.
    pub house_number: String,
    pub street_name: String,
    pub city: String,
    /// State or province.
    pub state: String,
    /// Postal code.
    pub pincode: String,
}

impl Address {
    /// Returns `(field name, value)` pairs in form order.
    ///
    /// Field names use the wire spelling so validation messages match what
    /// the caller submitted.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("houseNumber", &self.house_number),
            ("streetName", &self.street_name),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ]
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
///
/// Exactly one variant is active; switching variants drops the previous
/// variant's details because they live inside the variant.
///
/// ## Wire Tags
/// The `type` tag spellings (`cod`, `razorpay`, `upi`, `card`) are stored
/// with every order and must stay stable. Variant fields are camelCase
/// (`upiId`, `cardNumber`, `expiryDate`), matching validation field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum PaymentMethod {
    /// Pay the courier on delivery.
    #[default]
    #[serde(rename = "cod")]
    CashOnDelivery,

    /// Hosted payment gateway; the gateway owns its own input flow.
    #[serde(rename = "razorpay")]
    GatewayRedirect,

    /// Direct UPI collect request.
    #[serde(rename = "upi", rename_all = "camelCase")]
    Upi { upi_id: String },

    /// Card details entered on the storefront.
    #[serde(rename = "card", rename_all = "camelCase")]
    Card {
        card_number: String,
        expiry_date: String,
        cvv: String,
    },
}

impl PaymentMethod {
    /// All wire tags, in display order.
    pub const TAGS: [&'static str; 4] = ["cod", "razorpay", "upi", "card"];

    /// Returns the stable wire tag of the active variant.
    pub fn tag(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::GatewayRedirect => "razorpay",
            PaymentMethod::Upi { .. } => "upi",
            PaymentMethod::Card { .. } => "card",
        }
    }

    /// Human-readable label for order listings.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::GatewayRedirect => "Razorpay",
            PaymentMethod::Upi { .. } => "UPI",
            PaymentMethod::Card { .. } => "Card",
        }
    }

    /// Whether placing an order with this method goes through the gateway.
    pub fn is_gateway(&self) -> bool {
        matches!(self, PaymentMethod::GatewayRedirect)
    }

    /// Returns the copy of this method that is safe to persist.
    ///
    /// Card numbers keep only their last four digits and the CVV is dropped.
    /// Every other variant is returned unchanged.
    pub fn redacted(&self) -> PaymentMethod {
        match self {
            PaymentMethod::Card {
                card_number,
                expiry_date,
                ..
            } => {
                let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
                let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
                PaymentMethod::Card {
                    card_number: format!("**** {}", last4),
                    expiry_date: expiry_date.clone(),
                    cvv: String::new(),
                }
            }
            other => other.clone(),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of a placed order.
///
/// Operators may move an order from any status to any other status; no
/// transition table is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting fulfilment or payment reconciliation.
    #[default]
    Pending,
    /// Payment reconciled / accepted by the store.
    Confirmed,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled by an operator.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns the stable wire spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// Gateway correlation identifiers for a gateway-paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GatewayReference {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
}

/// Everything needed to create an order; the repository assigns the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: String,
    /// Line snapshot taken at placement time.
    pub items: Vec<CartLine>,
    /// Total frozen at placement time.
    pub total: Money,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub gateway: Option<GatewayReference>,
}

/// The durable record of a placed order.
///
/// Only `status`, `tracking_number`, the gateway ids and `updated_at`
/// change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Repository-assigned identifier (UUID v4).
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartLine>,
    #[ts(type = "number")]
    pub total_cents: i64,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub tracking_number: Option<String>,
}

impl Order {
    /// Returns the frozen total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Total number of copies across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
