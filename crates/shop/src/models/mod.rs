//! Domain models for the shop.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartEntry, CartLine, CartView};
pub use order::{LineItem, NewOrder, Order, OrderUser, ProductSnapshot};
pub use product::{FieldError, NewProduct, Product, ProductDraft, ValidationError};
pub use user::User;
