//! Cart engine: the per-user product/quantity mapping.

use std::sync::Arc;

use tamarind_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::error::{Result, ShopError};
use crate::models::cart::{CartEntry, CartLine, CartView};
use crate::stores::{CartStore, ProductStore};

/// Cart mutation and hydration.
pub struct CartService {
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
}

impl CartService {
    /// Create a cart service.
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>, carts: Arc<dyn CartStore>) -> Self {
        Self { products, carts }
    }

    /// Add one unit of a product to the user's cart.
    ///
    /// An already-present product gets its quantity incremented; there is
    /// no upper bound. Returns the resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the product does not exist.
    pub async fn add_to_cart(&self, user_id: UserId, product_id: ProductId) -> Result<u32> {
        // Resolve the product first so a dead link cannot create a dangling
        // cart row.
        if self.products.get(product_id).await?.is_none() {
            return Err(ShopError::NotFound(format!("product {product_id}")));
        }

        let quantity = self.carts.add_one(user_id, product_id).await?;
        tracing::debug!(%user_id, %product_id, quantity, "added product to cart");
        Ok(quantity)
    }

    /// Remove a product from the cart. Removing an absent product is a
    /// no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if the store fails.
    pub async fn remove_from_cart(&self, user_id: UserId, product_id: ProductId) -> Result<()> {
        self.carts.remove(user_id, product_id).await?;
        Ok(())
    }

    /// Empty the cart. Called by checkout after confirmed capture.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if the store fails.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        self.carts.clear(user_id).await?;
        Ok(())
    }

    /// The hydrated cart for display.
    ///
    /// Entries whose product was deleted from the catalog come back in
    /// `unavailable` so the frontend can say so.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if the store fails.
    pub async fn cart_view(&self, user_id: UserId) -> Result<CartView> {
        let entries = self.carts.entries(user_id).await?;
        let view = hydrate(&*self.products, &entries).await?;

        if !view.unavailable.is_empty() {
            tracing::warn!(
                %user_id,
                unavailable = view.unavailable.len(),
                "cart references deleted products"
            );
        }

        Ok(view)
    }
}

/// Resolve stored cart entries into full product data.
///
/// Shared with checkout, which snapshots the same hydrated lines.
pub(crate) async fn hydrate(
    products: &dyn ProductStore,
    entries: &[CartEntry],
) -> std::result::Result<CartView, RepositoryError> {
    let mut view = CartView::default();
    for entry in entries {
        match products.get(entry.product_id).await? {
            Some(product) => view.lines.push(CartLine {
                product,
                quantity: entry.quantity,
            }),
            None => view.unavailable.push(entry.product_id),
        }
    }
    Ok(view)
}
