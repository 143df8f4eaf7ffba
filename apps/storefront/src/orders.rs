//! # Order Status Management
//!
//! Operator-only changes to orders that already exist, plus the customer's
//! own order history.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    OrderStatusManager                                   │
//! │                                                                         │
//! │  operator: Option<&User>                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AdminPolicy::authorize ── none ──► AuthenticationRequired              │
//! │       │                  └─ not listed ──► Forbidden                    │
//! │       ▼                                                                 │
//! │  one repository call per request (no batching, no queue)                │
//! │  ├── update_status    → orders.update_status                            │
//! │  ├── confirm_payment  → orders.attach_payment                           │
//! │  ├── get_order        → orders.get                                      │
//! │  ├── list_orders      → orders.list_all                                 │
//! │  └── list_users       → users.list_all                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any status may follow any other status, `delivered → pending` included.

use std::sync::Arc;

use tracing::{debug, info};

use goonj_core::{CoreError, Order, OrderStatus, User};
use goonj_db::{OrderRepository, UserRepository};

use crate::error::ApiError;
use crate::identity::AdminPolicy;

/// Operator surface over persisted orders.
#[derive(Clone)]
pub struct OrderStatusManager {
    orders: Arc<dyn OrderRepository>,
    users: Option<UserRepository>,
    policy: AdminPolicy,
}

impl OrderStatusManager {
    pub fn new(orders: Arc<dyn OrderRepository>, policy: AdminPolicy) -> Self {
        OrderStatusManager {
            orders,
            users: None,
            policy,
        }
    }

    /// Attaches the user directory used by [`list_users`](Self::list_users).
    pub fn with_directory(mut self, users: UserRepository) -> Self {
        self.users = Some(users);
        self
    }

    /// Sets an order's status, optionally recording a tracking number.
    ///
    /// A missing or blank tracking number leaves the stored one untouched.
    ///
    /// ## Errors
    /// - `AuthenticationRequired` / `Forbidden` for non-operators
    /// - `NotFound` when the order does not exist
    /// - `PersistenceError` when the store is unreachable
    pub async fn update_status(
        &self,
        operator: Option<&User>,
        order_id: &str,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<(), ApiError> {
        let operator = self.policy.authorize(operator)?;
        debug!(order_id = %order_id, status = %status, "Updating order status");

        let tracking_number = tracking_number.filter(|t| !t.trim().is_empty());
        let has_tracking = tracking_number.is_some();
        self.orders
            .update_status(order_id, status, tracking_number)
            .await?;

        info!(
            order_id = %order_id,
            status = %status,
            tracking = has_tracking,
            operator = %operator.email,
            "Order status updated"
        );
        Ok(())
    }

    /// Records the gateway's ids on an order and marks it `confirmed`.
    pub async fn confirm_payment(
        &self,
        operator: Option<&User>,
        order_id: &str,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<(), ApiError> {
        let operator = self.policy.authorize(operator)?;
        if gateway_order_id.trim().is_empty() || gateway_payment_id.trim().is_empty() {
            return Err(ApiError::validation("Gateway order and payment ids are required"));
        }

        self.orders
            .attach_payment(order_id, gateway_order_id, gateway_payment_id)
            .await?;

        info!(
            order_id = %order_id,
            gateway_payment_id = %gateway_payment_id,
            operator = %operator.email,
            "Payment confirmed"
        );
        Ok(())
    }

    pub async fn get_order(&self, operator: Option<&User>, order_id: &str) -> Result<Order, ApiError> {
        self.policy.authorize(operator)?;
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", order_id))
    }

    /// Every order, newest first.
    pub async fn list_orders(&self, operator: Option<&User>) -> Result<Vec<Order>, ApiError> {
        self.policy.authorize(operator)?;
        let orders = self.orders.list_all().await?;
        debug!(count = orders.len(), "Listed all orders");
        Ok(orders)
    }

    /// Known users, ordered by display name. Empty without a directory.
    pub async fn list_users(&self, operator: Option<&User>) -> Result<Vec<User>, ApiError> {
        self.policy.authorize(operator)?;
        match &self.users {
            Some(users) => Ok(users.list_all().await?),
            None => Ok(Vec::new()),
        }
    }

    /// The signed-in customer's own orders, newest first.
    pub async fn order_history(&self, identity: Option<&User>) -> Result<Vec<Order>, ApiError> {
        let user = identity.ok_or(CoreError::AuthenticationRequired)?;
        Ok(self.orders.list_by_user(&user.uid).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::identity::identity_for_email;
    use goonj_core::{Address, Book, Cart, Money, NewOrder, PaymentMethod};
    use goonj_db::{Database, DbConfig};

    async fn setup() -> (Database, OrderStatusManager) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let manager = OrderStatusManager::new(
            Arc::new(db.orders()),
            AdminPolicy::from_emails(["ops@goonj.in"]),
        )
        .with_directory(db.users());
        (db, manager)
    }

    async fn place(db: &Database, user_id: &str) -> String {
        let mut cart = Cart::new();
        cart.add(Book {
            id: 3,
            title: "Godaan".into(),
            author: "Premchand".into(),
            category: "Fiction".into(),
            price_cents: 30000,
            pages: 312,
            language: "Hindi".into(),
            description: String::new(),
            image: String::new(),
            isbn: String::new(),
        });
        db.orders()
            .create(NewOrder {
                user_id: user_id.into(),
                items: cart.snapshot(),
                total: cart.total(),
                address: Address::default(),
                payment_method: PaymentMethod::CashOnDelivery,
                gateway: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_update_status_requires_operator() {
        let (db, manager) = setup().await;
        let id = place(&db, "u-1").await;
        let reader = identity_for_email("reader@goonj.in");

        let err = manager
            .update_status(Some(&reader), &id, OrderStatus::Shipped, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = manager
            .update_status(None, &id, OrderStatus::Shipped, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationRequired);

        let order = db.orders().get(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_any_status_may_follow_any_status() {
        let (db, manager) = setup().await;
        let id = place(&db, "u-1").await;
        let ops = identity_for_email("ops@goonj.in");

        manager
            .update_status(Some(&ops), &id, OrderStatus::Delivered, Some("TRK-9".into()))
            .await
            .unwrap();
        manager
            .update_status(Some(&ops), &id, OrderStatus::Pending, Some("   ".into()))
            .await
            .unwrap();

        let order = manager.get_order(Some(&ops), &id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.tracking_number.as_deref(), Some("TRK-9"));
        assert_eq!(order.total(), Money::from_cents(15000));
    }

    #[tokio::test]
    async fn test_confirm_payment_marks_confirmed() {
        let (db, manager) = setup().await;
        let id = place(&db, "u-1").await;
        let ops = identity_for_email("ops@goonj.in");

        let err = manager
            .confirm_payment(Some(&ops), &id, "order_1", " ")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        manager
            .confirm_payment(Some(&ops), &id, "order_1", "pay_1")
            .await
            .unwrap();
        let order = manager.get_order(Some(&ops), &id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_1"));
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let (_db, manager) = setup().await;
        let ops = identity_for_email("ops@goonj.in");

        let err = manager
            .update_status(Some(&ops), "missing", OrderStatus::Cancelled, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = manager.get_order(Some(&ops), "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_order_history_is_per_user() {
        let (db, manager) = setup().await;
        place(&db, "asha@goonj.in").await;
        place(&db, "ravi@goonj.in").await;

        let asha = identity_for_email("asha@goonj.in");
        let history = manager.order_history(Some(&asha)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id, "asha@goonj.in");

        let err = manager.order_history(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationRequired);
    }

    #[tokio::test]
    async fn test_list_users_from_directory() {
        let (db, manager) = setup().await;
        db.users().upsert(&identity_for_email("zoya@goonj.in")).await.unwrap();
        db.users().upsert(&identity_for_email("asha@goonj.in")).await.unwrap();
        let ops = identity_for_email("ops@goonj.in");

        let users = manager.list_users(Some(&ops)).await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.display_name.as_str()).collect();
        assert_eq!(names, ["asha", "zoya"]);
    }
}
