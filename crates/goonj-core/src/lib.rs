//! # goonj-core: Pure Domain Logic for the Goonj Storefront
//!
//! Everything about a book order that can be decided without touching a
//! disk, a network or a clock lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Goonj Storefront Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/storefront (orchestration)                 │   │
//! │  │   CheckoutWorkflow ── PaymentGateway ── OrderStatusManager      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ goonj-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ checkout │ │catalog │  │   │
//! │  │   │  Book   │ │  Money  │ │ reducer │ │  steps   │ │ books  │  │   │
//! │  │   │  Order  │ │markdown │ │  total  │ │  guards  │ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO ASYNC                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    goonj-db (Database Layer)                    │   │
//! │  │              SQLite orders and users, migrations                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Order, Address, PaymentMethod, ...)
//! - [`money`] - Integer money with the storewide markdown
//! - [`cart`] - The cart reducer
//! - [`checkout`] - Checkout steps and their guards
//! - [`catalog`] - Read-only book list
//! - [`validation`] - Form and record validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use goonj_core::{Book, Cart, Money};
//!
//! let book = Book {
//!     id: 1,
//!     title: "Gitanjali".into(),
//!     author: "Rabindranath Tagore".into(),
//!     category: "Poetry".into(),
//!     price_cents: 20000,
//!     pages: 104,
//!     language: "Bengali".into(),
//!     description: String::new(),
//!     image: String::new(),
//!     isbn: String::new(),
//! };
//!
//! let mut cart = Cart::new();
//! cart.add(book.clone());
//! cart.add(book);
//!
//! // ₹200 list price, half off, two copies
//! assert_eq!(cart.total(), Money::from_cents(20000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartAction, CartLine};
pub use catalog::Catalog;
pub use checkout::{CheckoutProgress, CheckoutStep};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storewide markdown in basis points (5000 = 50% off every book).
///
/// Applied uniformly to every cart line; not book-specific.
pub const STOREWIDE_MARKDOWN_BPS: u32 = 5000;

/// Most copies of one book a cart line can hold.
///
/// Adds and quantity changes past this are clamped to it.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Required length of a delivery phone number.
pub const PHONE_DIGITS: usize = 10;
