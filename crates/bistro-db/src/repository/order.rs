//! # Order Repository
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (checkout)                                                  │
//! │     └── create() → orders row + order_items rows, one transaction      │
//! │                    status = pending                                    │
//! │                                                                         │
//! │  2. STAFF UPDATES                                                      │
//! │     └── update_status() → checks the edge with OrderStatus rules,      │
//! │                           then writes only if nobody else moved it     │
//! │                                                                         │
//! │  3. READ                                                               │
//! │     └── get_by_id() / get_items() / list()                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bistro_core::{
    CheckoutItem, CheckoutPayload, CoreError, CustomerInfo, Fulfilment, Order, OrderDetail,
    OrderItem, OrderStatus, PriceBreakdown,
};

const ORDER_COLUMNS: &str = r#"
    id, status, fulfilment,
    subtotal_cents, tax_cents, delivery_fee_cents, total_cents,
    currency_code,
    customer_name, customer_phone, customer_email, customer_address, notes,
    created_at, updated_at
"#;

/// Default page size for order listings.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// An order ready to be written, with server-computed totals.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<CheckoutItem>,
    pub totals: PriceBreakdown,
    pub customer: CustomerInfo,
    pub fulfilment: Fulfilment,
    pub currency_code: String,
}

impl NewOrder {
    /// Builds an order from a payload that already passed
    /// [`CheckoutPayload::verify`], using the verified totals.
    pub fn from_checkout(payload: &CheckoutPayload, totals: PriceBreakdown) -> Self {
        NewOrder {
            items: payload.items.clone(),
            totals,
            customer: payload.customer_info.clone(),
            fulfilment: payload.fulfilment,
            currency_code: payload.currency_code.to_ascii_uppercase(),
        }
    }
}

/// Filter for [`OrderRepository::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Defaults to [`DEFAULT_LIST_LIMIT`].
    pub limit: Option<u32>,
}

/// Repository for orders and order items.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Writes the order header and its lines atomically.
    ///
    /// ## Snapshot Pattern
    /// Item names and prices are copied into `order_items`, so later menu
    /// edits never rewrite history.
    pub async fn create(&self, new_order: &NewOrder) -> DbResult<OrderDetail> {
        if new_order.items.is_empty() {
            return Err(CoreError::EmptyOrder.into());
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            status: OrderStatus::Pending,
            fulfilment: new_order.fulfilment,
            subtotal_cents: new_order.totals.subtotal.cents(),
            tax_cents: new_order.totals.tax.cents(),
            delivery_fee_cents: new_order.totals.delivery_fee.cents(),
            total_cents: new_order.totals.total.cents(),
            currency_code: new_order.currency_code.clone(),
            customer_name: new_order.customer.name.trim().to_string(),
            customer_phone: new_order.customer.phone.trim().to_string(),
            customer_email: new_order.customer.email.clone(),
            customer_address: new_order.customer.address.clone(),
            notes: new_order.customer.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %order.id, total_cents = order.total_cents, lines = new_order.items.len(), "Creating order");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, status, fulfilment,
                subtotal_cents, tax_cents, delivery_fee_cents, total_cents,
                currency_code,
                customer_name, customer_phone, customer_email, customer_address, notes,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8,
                ?9, ?10, ?11, ?12, ?13,
                ?14, ?15
            )
            "#,
        )
        .bind(&order.id)
        .bind(order.status)
        .bind(order.fulfilment)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.delivery_fee_cents)
        .bind(order.total_cents)
        .bind(&order.currency_code)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(&order.customer_address)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for line in &new_order.items {
            let quantity = i64::from(line.quantity);
            let line_total = (line.price * line.quantity).cents();

            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO order_items (
                    order_id, menu_item_id, name, unit_price_cents, quantity, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING id
                "#,
            )
            .bind(&order.id)
            .bind(line.id)
            .bind(&line.name)
            .bind(line.price.cents())
            .bind(quantity)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItem {
                id,
                order_id: order.id.clone(),
                menu_item_id: line.id,
                name: line.name.clone(),
                unit_price_cents: line.price.cents(),
                quantity,
                line_total_cents: line_total,
            });
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %order.id, total_cents = order.total_cents, "Order created");
        Ok(OrderDetail { order, items })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, menu_item_id, name, unit_price_cents, quantity, line_total_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Header and lines together.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<OrderDetail>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(id).await?;
        Ok(Some(OrderDetail { order, items }))
    }

    /// Newest first, optionally filtered by status.
    pub async fn list(&self, filter: OrderFilter) -> DbResult<Vec<Order>> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 500);

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        if let Some(status) = filter.status {
            qb.push(" WHERE status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(i64::from(limit));

        let orders = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok(orders)
    }

    /// Moves an order to `next` if the lifecycle allows it.
    ///
    /// ## Errors
    /// - `NotFound` for unknown ids
    /// - `Invalid(InvalidStatusTransition)` for a forbidden edge, including
    ///   the case where another request moved the order first
    pub async fn update_status(&self, id: &str, next: OrderStatus) -> DbResult<Order> {
        let mut order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let current = order.status;
        current.transition_to(next)?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(next)
        .bind(now)
        .bind(id)
        .bind(current)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Lost a race with another staff update; report against the
            // status that is stored now.
            let stored = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("Order", id))?;
            stored.status.transition_to(next)?;
            return Err(DbError::TransactionFailed(format!(
                "order {id} changed while updating"
            )));
        }

        info!(id = %id, from = %current, to = %next, "Order status updated");
        order.status = next;
        order.updated_at = now;
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::menu::NewMenuItem;
    use crate::{Database, DbConfig};
    use bistro_core::{Cart, CatalogItem, PricingPolicy};

    async fn setup() -> (Database, CheckoutPayload) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lasagna = db.menu().insert(&NewMenuItem::new("Lasagna", "Mains", 1000)).await.unwrap();
        let salad = db.menu().insert(&NewMenuItem::new("Salad", "Starters", 550)).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&CatalogItem::from(&lasagna), 2);
        cart.add_item(&CatalogItem::from(&salad), 1);

        let customer = CustomerInfo {
            name: "Ada".to_string(),
            phone: "555-0100-22".to_string(),
            address: Some("1 Main St".to_string()),
            ..Default::default()
        };
        let payload = CheckoutPayload::from_cart(
            &cart,
            &PricingPolicy::default(),
            Fulfilment::Delivery,
            customer,
            "usd",
        );
        (db, payload)
    }

    async fn create(db: &Database, payload: &CheckoutPayload) -> OrderDetail {
        let new_order = NewOrder::from_checkout(payload, payload.claimed_totals());
        db.orders().create(&new_order).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let (db, payload) = setup().await;
        let created = create(&db, &payload).await;

        assert_eq!(created.order.status, OrderStatus::Pending);
        assert_eq!(created.order.total_cents, 3353);
        assert_eq!(created.order.currency_code, "USD");

        let loaded = db.orders().get_detail(&created.order.id).await.unwrap().unwrap();
        assert_eq!(loaded.order.customer().name, "Ada");
        assert_eq!(loaded.order.fulfilment, Fulfilment::Delivery);
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].line_total_cents, 2000);
        assert_eq!(loaded.order.totals(), payload.claimed_totals());
    }

    #[tokio::test]
    async fn test_create_rolls_back_on_bad_item() {
        let (db, mut payload) = setup().await;
        payload.items[1].id = 777; // violates the menu_items foreign key

        let new_order = NewOrder::from_checkout(&payload, payload.claimed_totals());
        let err = db.orders().create(&new_order).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let all = db.orders().list(OrderFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let (db, payload) = setup().await;
        let id = create(&db, &payload).await.order.id;
        let orders = db.orders();

        assert_eq!(orders.update_status(&id, OrderStatus::Preparing).await.unwrap().status, OrderStatus::Preparing);
        orders.update_status(&id, OrderStatus::Ready).await.unwrap();
        orders.update_status(&id, OrderStatus::Delivered).await.unwrap();

        let err = orders.update_status(&id, OrderStatus::Cancelled).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(CoreError::InvalidStatusTransition { .. })));

        let stored = orders.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let (db, _) = setup().await;
        let err = db
            .orders()
            .update_status("00000000-0000-0000-0000-000000000000", OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (db, payload) = setup().await;
        let first = create(&db, &payload).await.order.id;
        create(&db, &payload).await;
        db.orders().update_status(&first, OrderStatus::Cancelled).await.unwrap();

        let pending = db
            .orders()
            .list(OrderFilter {
                status: Some(OrderStatus::Pending),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let limited = db
            .orders()
            .list(OrderFilter {
                status: None,
                limit: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
