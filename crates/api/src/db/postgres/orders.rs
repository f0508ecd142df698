//! Order repository and the transactional checkout unit.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use craftcart_core::order::OrderLine;
use craftcart_core::{OrderId, OrderStatus, ProductId, UserId};

use super::catalog::{PRODUCT_COLUMNS, ProductRow};
use crate::db::{CheckoutUnit, RepositoryError};
use crate::models::{NewOrder, Order, Product};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    buyer_id: i32,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price_at_purchase: Decimal,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            buyer_id: UserId::new(self.buyer_id),
            lines,
            total: self.total,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, buyer_id, total, status, created_at, updated_at";

/// Load items for `rows` and assemble orders, preserving row order.
async fn assemble(pool: &PgPool, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let items = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT order_id, product_id, quantity, price_at_purchase
        FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY order_id, position
        ",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(OrderLine {
            product_id: ProductId::new(item.product_id),
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
        });
    }

    rows.into_iter()
        .map(|row| {
            let lines = by_order.remove(&row.id).unwrap_or_default();
            row.into_order(lines)
        })
        .collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(assemble(self.pool, rows).await?.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        assemble(self.pool, rows).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE buyer_id = $1 ORDER BY id"
        ))
        .bind(buyer_id)
        .fetch_all(self.pool)
        .await?;

        assemble(self.pool, rows).await
    }

    /// Overwrite an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(assemble(self.pool, rows).await?.into_iter().next())
    }

    /// Open a checkout transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection is available.
    pub async fn begin_checkout(&self) -> Result<PgCheckout, RepositoryError> {
        Ok(PgCheckout {
            tx: self.pool.begin().await?,
        })
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Checkout unit backed by one database transaction.
///
/// Product rows are locked with `SELECT ... ORDER BY id FOR UPDATE`, so
/// concurrent checkouts touching the same product run one after another. Dropping the
/// unit rolls the transaction back.
pub struct PgCheckout {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutUnit for PgCheckout {
    async fn lock_products(
        &mut self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let product = Product::from(row);
                (product.id, product)
            })
            .collect())
    }

    async fn set_product_quantity(
        &mut self,
        id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET quantity = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(quantity)
                .execute(&mut *self.tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (buyer_id, total, status) VALUES ($1, $2, $3) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.buyer_id)
        .bind(order.total)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        for (position, line) in (0_i32..).zip(&order.lines) {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, position, product_id, quantity, price_at_purchase)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(row.id)
            .bind(position)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price_at_purchase)
            .execute(&mut *self.tx)
            .await?;
        }

        row.into_order(order.lines)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
