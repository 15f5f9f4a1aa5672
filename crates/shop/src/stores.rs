//! Document-store collaborator traits.
//!
//! The domain services never touch a database directly; they speak to these
//! traits. [`crate::db`] provides the `PostgreSQL` implementations and an
//! in-memory implementation ([`crate::db::memory::MemoryStore`]) used by
//! tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tamarind_core::{Email, OrderId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::cart::CartEntry;
use crate::models::order::{NewOrder, Order};
use crate::models::product::{NewProduct, Product};
use crate::models::user::User;

/// Product catalog storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product and return it with its assigned id.
    async fn insert(&self, new: NewProduct) -> Result<Product, RepositoryError>;

    /// Look up a product by id.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Overwrite a product's fields (matched by `product.id`).
    ///
    /// Returns `RepositoryError::NotFound` if the product no longer exists.
    async fn update(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Delete a product matched by both id and owner.
    ///
    /// Returns whether a row was deleted.
    async fn delete(&self, id: ProductId, owner_id: UserId) -> Result<bool, RepositoryError>;

    /// List products in insertion order, skipping `offset` rows.
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, RepositoryError>;

    /// Count all products.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// List products owned by `owner_id`, skipping `offset` rows.
    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Count products owned by `owner_id`.
    async fn count_by_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError>;
}

/// Cart storage, keyed by user id.
///
/// Implementations must keep each (user, product) pair unique and must make
/// `add_one` an atomic increment-or-insert, so two overlapping adds can
/// never produce duplicate rows or a lost update.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Add one unit of `product_id` to the user's cart.
    ///
    /// Inserts with quantity 1 when absent, increments when present.
    /// Returns the resulting quantity.
    async fn add_one(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<u32, RepositoryError>;

    /// Remove the entry for `product_id`. No-op when absent.
    async fn remove(&self, user_id: UserId, product_id: ProductId)
    -> Result<(), RepositoryError>;

    /// Remove every entry for the user.
    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError>;

    /// The user's cart entries.
    async fn entries(&self, user_id: UserId) -> Result<Vec<CartEntry>, RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order atomically (order row plus all line items).
    async fn insert(&self, new: NewOrder) -> Result<Order, RepositoryError>;

    /// Look up an order by id.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// The user's order history, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Remove an order whose payment capture failed.
    ///
    /// This is the compensation step of checkout, not a general delete:
    /// completed orders are immutable and are never removed.
    async fn discard(&self, id: OrderId) -> Result<(), RepositoryError>;
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account.
    ///
    /// Returns `RepositoryError::Conflict` when the email is taken.
    async fn insert(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError>;

    /// Look up a user by id.
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user by email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user holding `token` as their reset token.
    ///
    /// Expiry is checked by the caller against the stored
    /// `reset_token_expiry`.
    async fn get_by_reset_token(&self, token: &str) -> Result<Option<User>, RepositoryError>;

    /// Store a password-reset token and its expiry on the account.
    async fn set_reset_token(
        &self,
        user_id: UserId,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Replace the password hash and clear any reset token.
    async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;
}
