//! Cart models.
//!
//! The cart is a dedicated entity keyed by user id (one row per product),
//! mutated only through the cart service. The store enforces the invariant
//! that a product appears at most once per user; adding an already-present
//! product increments its quantity instead of duplicating the entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::ProductId;

use super::product::Product;

/// One stored cart row: a product reference and a positive quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A cart entry hydrated with current product data for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Total for this line at the product's current price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.line_total(self.quantity)
    }
}

/// The hydrated cart.
///
/// Entries whose product has since been deleted from the catalog are
/// surfaced in `unavailable` rather than silently dropped, so a frontend
/// can tell the user the item is gone.
#[derive(Debug, Clone, Default)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub unavailable: Vec<ProductId>,
}

impl CartView {
    /// Whether the cart holds no purchasable lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
