//! Cart repository for database operations.
//!
//! The `(user_id, product_id)` pair is the primary key, so a product can
//! never appear twice in one cart. `add_one` is a single upsert statement,
//! which keeps the increment atomic under concurrent requests.

use async_trait::async_trait;
use sqlx::PgPool;

use tamarind_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartEntry;
use crate::stores::CartStore;

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: i64,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartEntry {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "non-positive cart quantity {} for product {}",
                row.quantity, row.product_id
            ))
        })?;

        Ok(Self {
            product_id: ProductId::new(row.product_id),
            quantity,
        })
    }
}

/// `PostgreSQL`-backed cart store.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new cart store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn add_one(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<u32, RepositoryError> {
        let quantity: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.cart_item (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = shop.cart_item.quantity + 1
            RETURNING quantity
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        u32::try_from(quantity)
            .map_err(|_| RepositoryError::DataCorruption("cart quantity overflow".to_owned()))
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        // Absent rows are a no-op by contract, so rows_affected is not checked.
        sqlx::query(
            r"
            DELETE FROM shop.cart_item
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn entries(&self, user_id: UserId) -> Result<Vec<CartEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT product_id, quantity
            FROM shop.cart_item
            WHERE user_id = $1
            ORDER BY product_id ASC
            ",
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
