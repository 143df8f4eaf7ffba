//! # Repository Module
//!
//! Persistence contracts and their SQLite implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CheckoutWorkflow / OrderStatusManager                                  │
//! │       │                                                                 │
//! │       │  Arc<dyn OrderRepository>                                       │
//! │       ▼                                                                 │
//! │  OrderRepository (trait, this module)                                   │
//! │  ├── create(new_order)                     → order id                   │
//! │  ├── get(order_id)                         → Option<Order>              │
//! │  ├── list_by_user(user_id)                 → newest first               │
//! │  ├── list_all()                            → newest first               │
//! │  ├── update_status(id, status, tracking?)  → NotFound if absent         │
//! │  └── attach_payment(id, gw_order, gw_pay)  → NotFound if absent         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteOrderRepository (order.rs)  ──►  SQLite `orders` table           │
//! │                                                                         │
//! │  The workflow only sees the trait, so tests can swap in a store that    │
//! │  fails on demand or counts writes.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteOrderRepository`](order::SqliteOrderRepository) - Orders
//! - [`UserRepository`](user::UserRepository) - Signed-in user directory

use async_trait::async_trait;

use goonj_core::{NewOrder, Order, OrderStatus};

use crate::error::DbResult;

pub mod order;
pub mod user;

/// Durable store of placed orders.
///
/// Each call is independently atomic. The store does no cross-order
/// coordination, retries or locking.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Appends a new order with status `pending` and returns its id.
    ///
    /// `created_at` and `updated_at` are both set to the current time.
    async fn create(&self, order: NewOrder) -> DbResult<String>;

    /// Looks up one order.
    async fn get(&self, order_id: &str) -> DbResult<Option<Order>>;

    /// One user's orders, newest first. Empty when the user has none.
    async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>>;

    /// Every order, newest first.
    async fn list_all(&self) -> DbResult<Vec<Order>>;

    /// Sets the status and bumps `updated_at`.
    ///
    /// The tracking number is written only when one is supplied and not
    /// blank; otherwise the stored value is left alone.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no order has this id.
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> DbResult<()>;

    /// Records gateway correlation ids and marks the order `confirmed`.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no order has this id.
    async fn attach_payment(
        &self,
        order_id: &str,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> DbResult<()>;
}
