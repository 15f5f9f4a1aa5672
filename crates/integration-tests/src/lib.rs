//! Shared harness for Tamarind integration tests.
//!
//! Wires every domain service over the in-memory store, a temp-dir asset
//! store and a recording payment gateway, so whole shopper and admin flows
//! run without `PostgreSQL` or a payment provider.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use tamarind_shop::assets::FsAssetStore;
use tamarind_shop::db::memory::MemoryStore;
use tamarind_shop::payment::{ChargeOutcome, ChargeRequest, PaymentError, PaymentGateway};
use tamarind_shop::services::{
    AdminCatalogService, AuthService, CartService, CatalogService, CheckoutService, InvoiceService,
};

/// A payment gateway double that records every charge request.
#[derive(Default)]
pub struct RecordingGateway {
    charges: Mutex<Vec<ChargeRequest>>,
    fail_next: AtomicBool,
}

impl RecordingGateway {
    /// Make the next charge attempt fail with a decline.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// All charge requests seen so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges
            .lock()
            .expect("charge log lock poisoned")
            .clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome, PaymentError> {
        self.charges
            .lock()
            .expect("charge log lock poisoned")
            .push(request);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PaymentError::Declined("card declined".to_owned()));
        }

        Ok(ChargeOutcome {
            charge_id: format!("ch_{}", self.charges().len()),
        })
    }

    fn gateway_name(&self) -> &str {
        "recording"
    }
}

/// The full service stack over in-memory collaborators.
pub struct TestShop {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<RecordingGateway>,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub cart: CartService,
    pub checkout: CheckoutService,
    pub admin: AdminCatalogService,
    pub invoices: InvoiceService,
    upload_dir: tempfile::TempDir,
    invoice_dir: tempfile::TempDir,
}

impl TestShop {
    /// Build a fresh, empty shop.
    ///
    /// # Panics
    ///
    /// Panics if the temp directories cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::default());
        let upload_dir = tempfile::tempdir().expect("failed to create upload dir");
        let invoice_dir = tempfile::tempdir().expect("failed to create invoice dir");

        let assets = Arc::new(FsAssetStore::new(upload_dir.path()));

        Self {
            auth: AuthService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            cart: CartService::new(store.clone(), store.clone()),
            checkout: CheckoutService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                gateway.clone(),
                "usd",
            ),
            admin: AdminCatalogService::new(store.clone(), assets),
            invoices: InvoiceService::new(store.clone(), invoice_dir.path()),
            store,
            gateway,
            upload_dir,
            invoice_dir,
        }
    }

    /// Where uploaded product images land.
    #[must_use]
    pub fn upload_dir(&self) -> &std::path::Path {
        self.upload_dir.path()
    }

    /// Where invoice copies land.
    #[must_use]
    pub fn invoice_dir(&self) -> &std::path::Path {
        self.invoice_dir.path()
    }
}

impl Default for TestShop {
    fn default() -> Self {
        Self::new()
    }
}
