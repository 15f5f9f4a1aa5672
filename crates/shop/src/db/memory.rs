//! In-memory store implementing every document-store trait.
//!
//! Backs the test suites and local development without `PostgreSQL`. One
//! async mutex guards all state, which serializes each operation the same
//! way a single-statement query would be.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tamarind_core::{Email, OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartEntry;
use crate::models::order::{NewOrder, Order};
use crate::models::product::{NewProduct, Product};
use crate::models::user::User;
use crate::stores::{CartStore, OrderStore, ProductStore, UserStore};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    products: BTreeMap<i64, Product>,
    carts: HashMap<i64, BTreeMap<i64, u32>>,
    orders: BTreeMap<i64, Order>,
    next_user_id: i64,
    next_product_id: i64,
    next_order_id: i64,
}

/// In-memory document store for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: tokio::sync::Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner.next_product_id += 1;
        let product = Product {
            id: ProductId::new(inner.next_product_id),
            title: new.title,
            price: new.price,
            description: new.description,
            image_path: new.image_path,
            owner_id: new.owner_id,
        };
        inner.products.insert(product.id.as_i64(), product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.products.get(&id.as_i64()).cloned())
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        let slot = inner
            .products
            .get_mut(&product.id.as_i64())
            .ok_or(RepositoryError::NotFound)?;
        *slot = product.clone();
        Ok(())
    }

    async fn delete(&self, id: ProductId, owner_id: UserId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let owned = inner
            .products
            .get(&id.as_i64())
            .is_some_and(|p| p.owner_id == owner_id);
        if owned {
            inner.products.remove(&id.as_i64());
        }
        Ok(owned)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .products
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.products.len() as u64)
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .products
            .values()
            .filter(|p| p.owner_id == owner_id)
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count_by_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .products
            .values()
            .filter(|p| p.owner_id == owner_id)
            .count() as u64)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn add_one(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<u32, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let cart = inner.carts.entry(user_id.as_i64()).or_default();
        let quantity = cart.entry(product_id.as_i64()).or_insert(0);
        *quantity += 1;
        Ok(*quantity)
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        if let Some(cart) = inner.carts.get_mut(&user_id.as_i64()) {
            cart.remove(&product_id.as_i64());
        }
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner.carts.remove(&user_id.as_i64());
        Ok(())
    }

    async fn entries(&self, user_id: UserId) -> Result<Vec<CartEntry>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .carts
            .get(&user_id.as_i64())
            .map(|cart| {
                cart.iter()
                    .map(|(&product_id, &quantity)| CartEntry {
                        product_id: ProductId::new(product_id),
                        quantity,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner.next_order_id += 1;
        let order = Order {
            id: OrderId::new(inner.next_order_id),
            user: new.user,
            line_items: new.line_items,
            created_at: Utc::now(),
        };
        inner.orders.insert(order.id.as_i64(), order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.orders.get(&id.as_i64()).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.inner.lock().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.user.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn discard(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner
            .orders
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| &u.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            email: email.clone(),
            password_hash: password_hash.to_owned(),
            reset_token: None,
            reset_token_expiry: None,
        };
        inner.users.insert(user.id.as_i64(), user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&id.as_i64()).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| &u.email == email).cloned())
    }

    async fn get_by_reset_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn set_reset_token(
        &self,
        user_id: UserId,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&user_id.as_i64())
            .ok_or(RepositoryError::NotFound)?;
        user.reset_token = Some(token.to_owned());
        user.reset_token_expiry = Some(expiry);
        Ok(())
    }

    async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&user_id.as_i64())
            .ok_or(RepositoryError::NotFound)?;
        user.password_hash = password_hash.to_owned();
        user.reset_token = None;
        user.reset_token_expiry = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tamarind_core::Price;

    fn new_product(owner: i64, title: &str) -> NewProduct {
        NewProduct {
            title: title.to_owned(),
            price: Price::parse("1").unwrap(),
            description: "d".to_owned(),
            image_path: "images/x.png".to_owned(),
            owner_id: UserId::new(owner),
        }
    }

    #[tokio::test]
    async fn test_product_roundtrip() {
        let store = MemoryStore::new();
        let product = ProductStore::insert(&store, new_product(1, "A")).await.unwrap();
        let fetched = ProductStore::get(&store, product.id).await.unwrap().unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let store = MemoryStore::new();
        let product = ProductStore::insert(&store, new_product(1, "A")).await.unwrap();

        assert!(!store.delete(product.id, UserId::new(2)).await.unwrap());
        assert!(ProductStore::get(&store, product.id).await.unwrap().is_some());

        assert!(store.delete(product.id, UserId::new(1)).await.unwrap());
        assert!(ProductStore::get(&store, product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cart_add_one_increments() {
        let store = MemoryStore::new();
        let user = UserId::new(1);
        let product = ProductId::new(9);

        assert_eq!(store.add_one(user, product).await.unwrap(), 1);
        assert_eq!(store.add_one(user, product).await.unwrap(), 2);

        let entries = store.entries(user).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_user_email_conflict() {
        let store = MemoryStore::new();
        let email = Email::parse("a@b.c").unwrap();
        UserStore::insert(&store, &email, "h1").await.unwrap();
        let err = UserStore::insert(&store, &email, "h2").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
