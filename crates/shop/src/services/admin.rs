//! Admin catalog management: product CRUD with image assets.
//!
//! Every mutating operation is owner-scoped. A product belongs to the admin
//! who created it; anyone else editing or deleting it gets a hard
//! `Forbidden`, never a silent no-op.

use std::sync::Arc;

use tamarind_core::{ProductId, UserId};

use crate::assets::{AssetError, AssetStore};
use crate::error::{Result, ShopError};
use crate::models::product::{FieldError, NewProduct, Product, ProductDraft, ValidationError};
use crate::pagination::{Page, normalize_page};
use crate::stores::ProductStore;

/// Products shown per admin listing page.
pub const PAGE_SIZE: u64 = 2;

/// An uploaded image file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Write side of the product catalog.
pub struct AdminCatalogService {
    products: Arc<dyn ProductStore>,
    assets: Arc<dyn AssetStore>,
}

impl AdminCatalogService {
    /// Create an admin catalog service.
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>, assets: Arc<dyn AssetStore>) -> Self {
        Self { products, assets }
    }

    /// Create a product owned by `owner_id`.
    ///
    /// An image is mandatory on create. A missing or unsupported image is a
    /// validation failure like any other field, echoing the submitted draft
    /// so a form can re-render it.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Validation` with the echoed draft on any invalid
    /// field, or `ShopError::Repository`/`ShopError::Asset` on store
    /// failures.
    pub async fn create_product(
        &self,
        owner_id: UserId,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product> {
        let fields = draft.validate();
        let Some(image) = image else {
            let mut errors = vec![FieldError::new("image", "An image file is required")];
            if let Err(field_errors) = fields {
                errors.extend(field_errors);
            }
            return Err(ValidationError::new(draft, errors).into());
        };

        let (title, price, description) = match fields {
            Ok(fields) => fields,
            Err(errors) => return Err(ValidationError::new(draft, errors).into()),
        };

        let image_path = self.save_image(&draft, image).await?;

        let inserted = self
            .products
            .insert(NewProduct {
                title,
                price,
                description,
                image_path: image_path.clone(),
                owner_id,
            })
            .await;

        match inserted {
            Ok(product) => {
                tracing::info!(product_id = %product.id, %owner_id, "created product");
                Ok(product)
            }
            Err(err) => {
                // The row never landed, so the stored image is an orphan.
                if let Err(asset_err) = self.assets.delete(&image_path).await {
                    tracing::warn!(
                        path = image_path,
                        error = %asset_err,
                        "failed to remove image after aborted product insert"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Update a product the requester owns.
    ///
    /// The image is optional on edit: omitting it keeps the current one,
    /// supplying one replaces it and deletes the old asset.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the product does not exist,
    /// `ShopError::Forbidden` if the requester does not own it, or
    /// `ShopError::Validation` on invalid fields.
    pub async fn update_product(
        &self,
        requester: UserId,
        id: ProductId,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product> {
        let existing = self.get_owned(requester, id).await?;

        let (title, price, description) = match draft.validate() {
            Ok(fields) => fields,
            Err(errors) => return Err(ValidationError::new(draft, errors).into()),
        };

        let mut product = existing.clone();
        product.title = title;
        product.price = price;
        product.description = description;

        let new_image_path = match image {
            Some(image) => Some(self.save_image(&draft, image).await?),
            None => None,
        };
        if let Some(path) = &new_image_path {
            product.image_path = path.clone();
        }

        if let Err(err) = self.products.update(&product).await {
            // The row kept its old image, so the replacement is an orphan.
            if let Some(path) = &new_image_path
                && let Err(asset_err) = self.assets.delete(path).await
            {
                tracing::warn!(
                    path,
                    error = %asset_err,
                    "failed to remove image after aborted product update"
                );
            }
            return Err(err.into());
        }

        if product.image_path != existing.image_path {
            if let Err(err) = self.assets.delete(&existing.image_path).await {
                tracing::warn!(
                    path = existing.image_path,
                    error = %err,
                    "failed to remove replaced product image"
                );
            }
        }

        tracing::info!(product_id = %id, %requester, "updated product");
        Ok(product)
    }

    /// Delete a product the requester owns, along with its image asset.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the product does not exist or
    /// `ShopError::Forbidden` if the requester does not own it.
    pub async fn delete_product(&self, requester: UserId, id: ProductId) -> Result<()> {
        let product = self.get_owned(requester, id).await?;

        if !self.products.delete(id, requester).await? {
            // Raced with another delete.
            return Err(ShopError::NotFound(format!("product {id}")));
        }

        if let Err(err) = self.assets.delete(&product.image_path).await {
            tracing::warn!(
                path = product.image_path,
                error = %err,
                "failed to remove image of deleted product"
            );
        }

        tracing::info!(product_id = %id, %requester, "deleted product");
        Ok(())
    }

    /// One page of the requester's own products.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if the store fails.
    pub async fn list_products(&self, owner_id: UserId, page: u64) -> Result<Page<Product>> {
        let page = normalize_page(page);
        let total = self.products.count_by_owner(owner_id).await?;
        let items = self
            .products
            .list_by_owner(owner_id, Page::<Product>::offset(page, PAGE_SIZE), PAGE_SIZE)
            .await?;

        Ok(Page::build(items, total, page, PAGE_SIZE))
    }

    /// Fetch a product for editing, enforcing ownership.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` or `ShopError::Forbidden`.
    pub async fn get_owned(&self, requester: UserId, id: ProductId) -> Result<Product> {
        let product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("product {id}")))?;

        if product.owner_id != requester {
            return Err(ShopError::Forbidden(format!(
                "product {id} is not owned by user {requester}"
            )));
        }

        Ok(product)
    }

    async fn save_image(&self, echo: &ProductDraft, image: ImageUpload) -> Result<String> {
        match self.assets.save(&image.bytes, &image.file_name).await {
            Ok(path) => Ok(path),
            Err(AssetError::UnsupportedType) => Err(ValidationError::new(
                echo.clone(),
                vec![FieldError::new(
                    "image",
                    AssetError::UnsupportedType.to_string(),
                )],
            )
            .into()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assets::FsAssetStore;
    use crate::db::RepositoryError;
    use crate::db::memory::MemoryStore;
    use async_trait::async_trait;
    use std::result::Result;

    /// Delegates to `MemoryStore` but refuses every row update.
    struct UpdateFailsStore(MemoryStore);

    #[async_trait]
    impl ProductStore for UpdateFailsStore {
        async fn insert(&self, new: NewProduct) -> Result<Product, RepositoryError> {
            ProductStore::insert(&self.0, new).await
        }

        async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
            ProductStore::get(&self.0, id).await
        }

        async fn update(&self, _product: &Product) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn delete(&self, id: ProductId, owner_id: UserId) -> Result<bool, RepositoryError> {
            self.0.delete(id, owner_id).await
        }

        async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, RepositoryError> {
            self.0.list(offset, limit).await
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            self.0.count().await
        }

        async fn list_by_owner(
            &self,
            owner_id: UserId,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<Product>, RepositoryError> {
            self.0.list_by_owner(owner_id, offset, limit).await
        }

        async fn count_by_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError> {
            self.0.count_by_owner(owner_id).await
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<MemoryStore>,
        admin: AdminCatalogService,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let assets = Arc::new(FsAssetStore::new(dir.path()));
        let admin = AdminCatalogService::new(store.clone(), assets);
        Fixture {
            _dir: dir,
            store,
            admin,
        }
    }

    fn draft(title: &str, price: &str) -> ProductDraft {
        ProductDraft {
            title: title.to_owned(),
            price: price.to_owned(),
            description: "desc".to_owned(),
        }
    }

    fn upload(name: &str) -> Option<ImageUpload> {
        Some(ImageUpload {
            bytes: b"fake-image".to_vec(),
            file_name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn test_create_stores_product_and_image() {
        let f = fixture();
        let product = f
            .admin
            .create_product(UserId::new(1), draft("Book", "12.99"), upload("b.png"))
            .await
            .unwrap();

        assert_eq!(product.title, "Book");
        assert!(product.image_path.ends_with(".png"));
        assert!(tokio::fs::metadata(&product.image_path).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_without_image_echoes_draft() {
        let f = fixture();
        let submitted = draft("Book", "12.99");
        let err = f
            .admin
            .create_product(UserId::new(1), submitted.clone(), None)
            .await
            .unwrap_err();

        let ShopError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert_eq!(validation.draft, submitted);
        assert_eq!(validation.errors.first().unwrap().field, "image");
    }

    #[tokio::test]
    async fn test_create_with_unsupported_image_type() {
        let f = fixture();
        let err = f
            .admin
            .create_product(UserId::new(1), draft("Book", "1"), upload("b.gif"))
            .await
            .unwrap_err();
        let ShopError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert_eq!(validation.errors.first().unwrap().field, "image");
    }

    #[tokio::test]
    async fn test_create_with_bad_fields_echoes_draft() {
        let f = fixture();
        let submitted = draft("", "cheap");
        let err = f
            .admin
            .create_product(UserId::new(1), submitted.clone(), upload("b.png"))
            .await
            .unwrap_err();
        let ShopError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert_eq!(validation.draft, submitted);
        assert_eq!(validation.errors.len(), 2);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let f = fixture();
        let product = f
            .admin
            .create_product(UserId::new(1), draft("Book", "1"), upload("b.png"))
            .await
            .unwrap();

        let err = f
            .admin
            .update_product(UserId::new(2), product.id, draft("Hijacked", "1"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Forbidden(_)));

        // Unchanged.
        let stored = ProductStore::get(&*f.store, product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Book");
    }

    #[tokio::test]
    async fn test_update_replaces_image_and_deletes_old() {
        let f = fixture();
        let owner = UserId::new(1);
        let product = f
            .admin
            .create_product(owner, draft("Book", "1"), upload("old.png"))
            .await
            .unwrap();
        let old_path = product.image_path.clone();

        let updated = f
            .admin
            .update_product(owner, product.id, draft("Book", "2"), upload("new.jpg"))
            .await
            .unwrap();

        assert_ne!(updated.image_path, old_path);
        assert!(tokio::fs::metadata(&old_path).await.is_err());
        assert!(tokio::fs::metadata(&updated.image_path).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_current() {
        let f = fixture();
        let owner = UserId::new(1);
        let product = f
            .admin
            .create_product(owner, draft("Book", "1"), upload("b.png"))
            .await
            .unwrap();

        let updated = f
            .admin
            .update_product(owner, product.id, draft("Book v2", "3"), None)
            .await
            .unwrap();

        assert_eq!(updated.image_path, product.image_path);
        assert_eq!(updated.title, "Book v2");
        assert!(tokio::fs::metadata(&product.image_path).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_update_removes_replacement_image() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Arc::new(FsAssetStore::new(dir.path()));
        let store = Arc::new(UpdateFailsStore(MemoryStore::new()));
        let admin = AdminCatalogService::new(store, assets);
        let owner = UserId::new(1);

        let product = admin
            .create_product(owner, draft("Book", "1"), upload("old.png"))
            .await
            .unwrap();

        let err = admin
            .update_product(owner, product.id, draft("Book", "2"), upload("new.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Repository(_)));

        // The replacement never landed and the original is untouched.
        assert!(tokio::fs::metadata(&product.image_path).await.is_ok());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_product_and_image() {
        let f = fixture();
        let owner = UserId::new(1);
        let product = f
            .admin
            .create_product(owner, draft("Book", "1"), upload("b.png"))
            .await
            .unwrap();

        f.admin.delete_product(owner, product.id).await.unwrap();

        assert!(
            ProductStore::get(&*f.store, product.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(tokio::fs::metadata(&product.image_path).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let f = fixture();
        let product = f
            .admin
            .create_product(UserId::new(1), draft("Book", "1"), upload("b.png"))
            .await
            .unwrap();

        let err = f
            .admin
            .delete_product(UserId::new(2), product.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Forbidden(_)));
        assert!(
            ProductStore::get(&*f.store, product.id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_listing_is_owner_scoped() {
        let f = fixture();
        for (owner, title) in [(1, "Mine"), (1, "Also mine"), (2, "Theirs")] {
            f.admin
                .create_product(UserId::new(owner), draft(title, "1"), upload("p.png"))
                .await
                .unwrap();
        }

        let page = f.admin.list_products(UserId::new(1), 1).await.unwrap();
        assert_eq!(page.total_items, 2);
        assert!(page.items.iter().all(|p| p.owner_id == UserId::new(1)));
    }
}
