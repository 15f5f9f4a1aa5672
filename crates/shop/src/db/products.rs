//! Product repository for database operations.
//!
//! Queries are runtime-bound (`sqlx::query_as`) so the crate builds without
//! a live database; rows are validated into domain models via `TryFrom`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product};
use crate::stores::ProductStore;

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    title: String,
    price: Decimal,
    description: String,
    image_path: String,
    owner_id: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            title: row.title,
            price,
            description: row.description,
            image_path: row.image_path,
            owner_id: UserId::new(row.owner_id),
        })
    }
}

/// `PostgreSQL`-backed product store.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO shop.product (title, price, description, image_path, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, price, description, image_path, owner_id
            ",
        )
        .bind(&new.title)
        .bind(new.price.amount())
        .bind(&new.description)
        .bind(&new.image_path)
        .bind(new.owner_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, price, description, image_path, owner_id
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.product
            SET title = $1, price = $2, description = $3, image_path = $4
            WHERE id = $5
            ",
        )
        .bind(&product.title)
        .bind(product.price.amount())
        .bind(&product.description)
        .bind(&product.image_path)
        .bind(product.id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: ProductId, owner_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.product
            WHERE id = $1 AND owner_id = $2
            ",
        )
        .bind(id.as_i64())
        .bind(owner_id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, price, description, image_path, owner_id
            FROM shop.product
            ORDER BY id ASC
            OFFSET $1 LIMIT $2
            ",
        )
        .bind(to_i64(offset))
        .bind(to_i64(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.unsigned_abs())
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, price, description, image_path, owner_id
            FROM shop.product
            WHERE owner_id = $1
            ORDER BY id ASC
            OFFSET $2 LIMIT $3
            ",
        )
        .bind(owner_id.as_i64())
        .bind(to_i64(offset))
        .bind(to_i64(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_by_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shop.product WHERE owner_id = $1")
                .bind(owner_id.as_i64())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unsigned_abs())
    }
}

/// Postgres OFFSET/LIMIT parameters are signed.
fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
