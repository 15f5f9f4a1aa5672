//! Domain services.
//!
//! Each service is a thin struct over the collaborator traits in
//! [`crate::stores`] (plus [`crate::assets`] and [`crate::payment`] where
//! needed) and owns one slice of the business rules. A web frontend
//! resolves the authenticated user and calls in here.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod invoice;

pub use admin::{AdminCatalogService, ImageUpload};
pub use auth::AuthService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use invoice::{Invoice, InvoiceService};
