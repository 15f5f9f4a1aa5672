//! Storefront catalog reads: paginated listing and product detail.

use std::sync::Arc;

use tamarind_core::ProductId;

use crate::error::{Result, ShopError};
use crate::models::product::Product;
use crate::pagination::{Page, normalize_page};
use crate::stores::ProductStore;

/// Products shown per storefront listing page.
pub const PAGE_SIZE: u64 = 2;

/// Read side of the product catalog.
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
}

impl CatalogService {
    /// Create a catalog service.
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    /// One page of the catalog, oldest products first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if the store fails.
    pub async fn list_products(&self, page: u64) -> Result<Page<Product>> {
        let page = normalize_page(page);
        let total = self.products.count().await?;
        let items = self
            .products
            .list(Page::<Product>::offset(page, PAGE_SIZE), PAGE_SIZE)
            .await?;

        Ok(Page::build(items, total, page, PAGE_SIZE))
    }

    /// Product detail lookup.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if no product has this id.
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("product {id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::product::NewProduct;
    use tamarind_core::{Price, UserId};

    async fn seeded_catalog(count: usize) -> CatalogService {
        let store = Arc::new(MemoryStore::new());
        for i in 0..count {
            ProductStore::insert(
                &*store,
                NewProduct {
                    title: format!("Product {}", i + 1),
                    price: Price::parse("1").unwrap(),
                    description: "d".to_owned(),
                    image_path: "images/p.png".to_owned(),
                    owner_id: UserId::new(1),
                },
            )
            .await
            .unwrap();
        }
        CatalogService::new(store)
    }

    #[tokio::test]
    async fn test_five_products_page_one() {
        let catalog = seeded_catalog(5).await;
        let page = catalog.list_products(1).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items.first().unwrap().title, "Product 1");
        assert!(page.has_next_page);
        assert!(!page.has_previous_page);
    }

    #[tokio::test]
    async fn test_five_products_page_three() {
        let catalog = seeded_catalog(5).await;
        let page = catalog.list_products(3).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items.first().unwrap().title, "Product 5");
        assert!(!page.has_next_page);
        assert!(page.has_previous_page);
    }

    #[tokio::test]
    async fn test_page_zero_means_first_page() {
        let catalog = seeded_catalog(3).await;
        let page = catalog.list_products(0).await.unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let catalog = seeded_catalog(0).await;
        let err = catalog.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
    }
}
