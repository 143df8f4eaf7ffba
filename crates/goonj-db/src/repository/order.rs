//! # Order Repository
//!
//! SQLite implementation of [`OrderRepository`].
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (checkout)                                                  │
//! │     └── create() → Order { status: Pending }                           │
//! │         items / address / payment method frozen as JSON                │
//! │                                                                         │
//! │  2. RECONCILE (optional, operator)                                     │
//! │     └── attach_payment() → gateway ids set, status: Confirmed          │
//! │                                                                         │
//! │  3. FULFIL (operator, any order of steps)                              │
//! │     └── update_status() → Shipped / Delivered / Cancelled / ...        │
//! │         tracking number set only when supplied                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are built at runtime with `sqlx::query` and rows are mapped by
//! hand, because three of the columns are JSON documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use goonj_core::{Address, CartLine, NewOrder, Order, OrderStatus, PaymentMethod};

use super::OrderRepository;
use crate::error::{DbError, DbResult};

const ORDER_COLUMNS: &str = r#"
    id, user_id, items_json, total_cents, address_json, payment_method_json,
    status, gateway_order_id, gateway_payment_id, tracking_number,
    created_at, updated_at
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    /// Creates a new SqliteOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteOrderRepository { pool }
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch_orders(&self, user_id: Option<&str>) -> DbResult<Vec<Order>> {
        // rowid breaks ties between orders created in the same instant
        let rows = match user_id {
            Some(user_id) => {
                let sql = format!(
                    "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
                    ORDER_COLUMNS
                );
                sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
                    ORDER_COLUMNS
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        rows.iter().map(order_from_row).collect()
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create(&self, order: NewOrder) -> DbResult<String> {
        let id = generate_order_id();
        let now = Utc::now();
        let payment_method = order.payment_method.redacted();

        debug!(
            order_id = %id,
            user_id = %order.user_id,
            total_cents = order.total.cents(),
            payment = payment_method.tag(),
            "Inserting order"
        );

        let items_json = serde_json::to_string(&order.items)?;
        let address_json = serde_json::to_string(&order.address)?;
        let payment_json = serde_json::to_string(&payment_method)?;
        let (gateway_order_id, gateway_payment_id) = match order.gateway {
            Some(reference) => (
                Some(reference.gateway_order_id),
                Some(reference.gateway_payment_id),
            ),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, items_json, total_cents, address_json,
                payment_method_json, payment_type, status,
                gateway_order_id, gateway_payment_id, tracking_number,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, NULL,
                ?11, ?11
            )
            "#,
        )
        .bind(&id)
        .bind(&order.user_id)
        .bind(items_json)
        .bind(order.total.cents())
        .bind(address_json)
        .bind(payment_json)
        .bind(payment_method.tag())
        .bind(OrderStatus::Pending)
        .bind(gateway_order_id)
        .bind(gateway_payment_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(order_id = %id, user_id = %order.user_id, "Order created");
        Ok(id)
    }

    async fn get(&self, order_id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        debug!(user_id = %user_id, "Listing orders for user");
        self.fetch_orders(Some(user_id)).await
    }

    async fn list_all(&self) -> DbResult<Vec<Order>> {
        debug!("Listing all orders");
        self.fetch_orders(None).await
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> DbResult<()> {
        let tracking_number = tracking_number
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        debug!(
            order_id = %order_id,
            status = %status,
            tracking = tracking_number.as_deref().unwrap_or(""),
            "Updating order status"
        );

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?1,
                tracking_number = COALESCE(?2, tracking_number),
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(status)
        .bind(tracking_number)
        .bind(Utc::now())
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        info!(order_id = %order_id, status = %status, "Order status updated");
        Ok(())
    }

    async fn attach_payment(
        &self,
        order_id: &str,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> DbResult<()> {
        debug!(
            order_id = %order_id,
            gateway_order_id = %gateway_order_id,
            "Attaching gateway payment"
        );

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET gateway_order_id = ?1,
                gateway_payment_id = ?2,
                status = ?3,
                updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(gateway_order_id)
        .bind(gateway_payment_id)
        .bind(OrderStatus::Confirmed)
        .bind(Utc::now())
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        info!(order_id = %order_id, "Order payment confirmed");
        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn order_from_row(row: &SqliteRow) -> DbResult<Order> {
    let items: Vec<CartLine> = serde_json::from_str(row.try_get::<&str, _>("items_json")?)?;
    let address: Address = serde_json::from_str(row.try_get::<&str, _>("address_json")?)?;
    let payment_method: PaymentMethod =
        serde_json::from_str(row.try_get::<&str, _>("payment_method_json")?)?;

    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        items,
        total_cents: row.try_get("total_cents")?,
        address,
        payment_method,
        status: row.try_get::<OrderStatus, _>("status")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        gateway_order_id: row.try_get("gateway_order_id")?,
        gateway_payment_id: row.try_get("gateway_payment_id")?,
        tracking_number: row.try_get("tracking_number")?,
    })
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use goonj_core::{Book, Cart, GatewayReference, Money};
    use std::time::Duration;

    fn book(id: i64, price_cents: i64) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "Author".to_string(),
            category: "Essays".to_string(),
            price_cents,
            pages: 150,
            language: "English".to_string(),
            description: String::new(),
            image: String::new(),
            isbn: String::new(),
        }
    }

    fn address() -> Address {
        Address {
            full_name: "Meera Iyer".to_string(),
            phone: "9000000001".to_string(),
            house_number: "7".to_string(),
            street_name: "Anna Salai".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "600002".to_string(),
        }
    }

    fn new_order(user_id: &str, method: PaymentMethod) -> NewOrder {
        let mut cart = Cart::new();
        cart.add(book(1, 20000));
        cart.add(book(1, 20000));
        cart.add(book(2, 35000));
        NewOrder {
            user_id: user_id.to_string(),
            items: cart.snapshot(),
            total: cart.total(),
            address: address(),
            payment_method: method,
            gateway: None,
        }
    }

    async fn repo() -> (Database, SqliteOrderRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        (db, orders)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_db, orders) = repo().await;
        let id = orders
            .create(new_order("u-1", PaymentMethod::CashOnDelivery))
            .await
            .unwrap();

        let order = orders.get(&id).await.unwrap().unwrap();
        assert_eq!(order.user_id, "u-1");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.total(), Money::from_cents(37500));
        assert_eq!(order.address, address());
        assert_eq!(order.created_at, order.updated_at);
        assert!(order.tracking_number.is_none());
        assert!(order.gateway_order_id.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (_db, orders) = repo().await;
        assert!(orders.get("no-such-order").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_records_gateway_reference() {
        let (_db, orders) = repo().await;
        let mut order = new_order("u-1", PaymentMethod::GatewayRedirect);
        order.gateway = Some(GatewayReference {
            gateway_order_id: "order_1".to_string(),
            gateway_payment_id: "pay_1".to_string(),
        });

        let id = orders.create(order).await.unwrap();
        let stored = orders.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.gateway_order_id.as_deref(), Some("order_1"));
        assert_eq!(stored.gateway_payment_id.as_deref(), Some("pay_1"));
        assert_eq!(stored.payment_method, PaymentMethod::GatewayRedirect);
    }

    #[tokio::test]
    async fn test_card_details_are_redacted() {
        let (_db, orders) = repo().await;
        let id = orders
            .create(new_order(
                "u-1",
                PaymentMethod::Card {
                    card_number: "5500 0000 0000 0004".to_string(),
                    expiry_date: "08/28".to_string(),
                    cvv: "999".to_string(),
                },
            ))
            .await
            .unwrap();

        let stored = orders.get(&id).await.unwrap().unwrap();
        match stored.payment_method {
            PaymentMethod::Card {
                card_number, cvv, ..
            } => {
                assert_eq!(card_number, "**** 0004");
                assert!(cvv.is_empty());
            }
            other => panic!("unexpected payment method: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let (_db, orders) = repo().await;
        let first = orders
            .create(new_order("u-1", PaymentMethod::CashOnDelivery))
            .await
            .unwrap();
        let other_user = orders
            .create(new_order("u-2", PaymentMethod::CashOnDelivery))
            .await
            .unwrap();
        let second = orders
            .create(new_order("u-1", PaymentMethod::CashOnDelivery))
            .await
            .unwrap();

        let mine: Vec<String> = orders
            .list_by_user("u-1")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(mine, vec![second.clone(), first.clone()]);

        let all: Vec<String> = orders
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(all, vec![second, other_user, first]);

        assert!(orders.list_by_user("nobody").await.unwrap().is_empty());
        assert_eq!(orders.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_status_keeps_tracking_when_absent() {
        let (_db, orders) = repo().await;
        let id = orders
            .create(new_order("u-1", PaymentMethod::CashOnDelivery))
            .await
            .unwrap();

        orders
            .update_status(&id, OrderStatus::Shipped, Some("TRK-42".to_string()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        orders
            .update_status(&id, OrderStatus::Delivered, None)
            .await
            .unwrap();
        orders
            .update_status(&id, OrderStatus::Delivered, Some("   ".to_string()))
            .await
            .unwrap();

        let order = orders.get(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.tracking_number.as_deref(), Some("TRK-42"));
        assert!(order.updated_at > order.created_at);
    }

    #[tokio::test]
    async fn test_any_status_may_follow_any_status() {
        let (_db, orders) = repo().await;
        let id = orders
            .create(new_order("u-1", PaymentMethod::CashOnDelivery))
            .await
            .unwrap();

        for status in [
            OrderStatus::Delivered,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            OrderStatus::Confirmed,
        ] {
            orders.update_status(&id, status, None).await.unwrap();
            assert_eq!(orders.get(&id).await.unwrap().unwrap().status, status);
        }
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let (_db, orders) = repo().await;
        let err = orders
            .update_status("missing", OrderStatus::Shipped, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = orders
            .attach_payment("missing", "order_x", "pay_x")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_attach_payment_confirms_order() {
        let (_db, orders) = repo().await;
        let id = orders
            .create(new_order("u-1", PaymentMethod::GatewayRedirect))
            .await
            .unwrap();

        orders.attach_payment(&id, "order_9", "pay_9").await.unwrap();

        let order = orders.get(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.gateway_order_id.as_deref(), Some("order_9"));
        assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_9"));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_failure() {
        let (db, orders) = repo().await;
        db.close().await;

        let err = orders
            .create(new_order("u-1", PaymentMethod::CashOnDelivery))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert!(orders.list_all().await.is_err());
    }
}
