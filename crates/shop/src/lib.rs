//! Tamarind Shop - Storefront domain logic.
//!
//! This crate implements the domain core of a server-rendered e-commerce
//! storefront: catalog browsing, a per-user shopping cart, checkout with
//! payment capture, order history, generated PDF invoices, account
//! management, and the admin product catalog.
//!
//! # Architecture
//!
//! - Domain services ([`services`]) own all business rules and speak to the
//!   outside world only through collaborator traits
//! - Document storage is behind the traits in [`stores`], with a
//!   `PostgreSQL` implementation in [`db`] and an in-memory implementation
//!   for tests and local development
//! - Image uploads live behind [`assets::AssetStore`]
//! - Payment capture lives behind [`payment::PaymentGateway`]; no provider
//!   SDK is wired in here
//!
//! The HTTP layer (routing, templates, sessions) is intentionally absent:
//! a web frontend resolves the authenticated user and delegates to these
//! services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assets;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod payment;
pub mod pdf;
pub mod services;
pub mod stores;

pub use config::ShopConfig;
pub use error::{Result, ShopError};
