//! Order repository for database operations.
//!
//! Orders are written once and never updated. Line-item product snapshots
//! are stored as serialized JSON blobs, so a snapshot can only ever change
//! if the row itself is rewritten, which no code path does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tamarind_core::{Email, OrderId, UserId};

use super::RepositoryError;
use crate::models::order::{LineItem, NewOrder, Order, OrderUser, ProductSnapshot};
use crate::stores::OrderStore;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    product_snapshot: Vec<u8>,
    quantity: i32,
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = RepositoryError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        let product: ProductSnapshot = serde_json::from_slice(&row.product_snapshot)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid snapshot data: {e}")))?;

        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("non-positive quantity {}", row.quantity))
        })?;

        Ok(Self { product, quantity })
    }
}

fn order_user(row: &OrderRow) -> Result<OrderUser, RepositoryError> {
    let email = Email::parse(&row.email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    Ok(OrderUser {
        user_id: UserId::new(row.user_id),
        email,
    })
}

/// `PostgreSQL`-backed order store.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn line_items(&self, order_id: i64) -> Result<Vec<LineItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r"
            SELECT product_snapshot, quantity
            FROM shop.order_line_item
            WHERE order_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO shop.customer_order (user_id, email)
            VALUES ($1, $2)
            RETURNING id, created_at
            ",
        )
        .bind(new.user.user_id.as_i64())
        .bind(new.user.email.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in new.line_items.iter().enumerate() {
            let snapshot = serde_json::to_vec(&item.product).map_err(|e| {
                RepositoryError::DataCorruption(format!("failed to serialize snapshot: {e}"))
            })?;

            sqlx::query(
                r"
                INSERT INTO shop.order_line_item (order_id, position, product_snapshot, quantity)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(id)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .bind(&snapshot)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(id),
            user: new.user,
            line_items: new.line_items,
            created_at,
        })
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, email, created_at
            FROM shop.customer_order
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = order_user(&row)?;
        let line_items = self.line_items(row.id).await?;

        Ok(Some(Order {
            id: OrderId::new(row.id),
            user,
            line_items,
            created_at: row.created_at,
        }))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, email, created_at
            FROM shop.customer_order
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let user = order_user(&row)?;
            let line_items = self.line_items(row.id).await?;
            orders.push(Order {
                id: OrderId::new(row.id),
                user,
                line_items,
                created_at: row.created_at,
            });
        }

        Ok(orders)
    }

    async fn discard(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shop.order_line_item WHERE order_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM shop.customer_order WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}
