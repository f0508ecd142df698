//! Cart repository.

use sqlx::PgPool;

use craftcart_core::cart::{CartLine, CartLines};
use craftcart_core::{CartId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::Cart;

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: i32,
    quantity: i32,
}

impl From<CartItemRow> for CartLine {
    fn from(row: CartItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
        }
    }
}

/// Repository for carts and their lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's cart with its lines in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart_id: Option<i32> = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        let Some(cart_id) = cart_id else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT product_id, quantity FROM cart_items WHERE cart_id = $1 ORDER BY position",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        let lines: Vec<CartLine> = rows.into_iter().map(Into::into).collect();
        Ok(Some(Cart {
            id: Some(CartId::new(cart_id)),
            user_id,
            lines: lines.into(),
        }))
    }

    /// Create the user's cart if needed and replace its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails; nothing is
    /// written in that case.
    pub async fn save(&self, user_id: UserId, lines: &CartLines) -> Result<Cart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO carts (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        for (position, line) in (0_i32..).zip(lines) {
            sqlx::query(
                r"
                INSERT INTO cart_items (cart_id, position, product_id, quantity)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(cart_id)
            .bind(position)
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Cart {
            id: Some(CartId::new(cart_id)),
            user_id,
            lines: lines.clone(),
        })
    }
}
