//! Order models.
//!
//! An order is an immutable point-in-time snapshot of a checkout. Line
//! items deep-copy the full product record at purchase time, so later
//! catalog edits never alter order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{Email, OrderId, Price, ProductId, UserId};

use super::product::Product;

/// The purchasing user, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUser {
    pub user_id: UserId,
    pub email: Email,
}

/// Full product data frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub title: String,
    pub price: Price,
    pub description: String,
    pub image_path: String,
    pub owner_id: UserId,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            description: product.description.clone(),
            image_path: product.image_path.clone(),
            owner_id: product.owner_id,
        }
    }
}

/// One (product snapshot, quantity) pair within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl LineItem {
    /// Total for this line at the snapshotted price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.line_total(self.quantity)
    }
}

/// A completed checkout, ready for insertion (no id yet).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user: OrderUser,
    pub line_items: Vec<LineItem>,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: OrderUser,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Order total recomputed from the stored snapshots.
    ///
    /// Matches the amount charged at checkout as long as the snapshots are
    /// intact, which is the order engine's core invariant.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.line_items.iter().map(LineItem::line_total).sum()
    }
}
