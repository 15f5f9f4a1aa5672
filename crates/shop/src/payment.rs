//! Payment gateway collaborator.
//!
//! The provider SDK is not wired in here; checkout only needs something
//! that accepts an amount plus a source token and reports success or
//! failure. Deployments supply a real implementation, tests supply a
//! recording fake.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// A request to capture payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Amount in minor currency units (cents).
    pub amount_minor_units: i64,
    /// ISO 4217 currency code, lowercase.
    pub currency: String,
    /// Opaque payment source token collected by the frontend.
    pub source_token: String,
    /// Correlation metadata attached to the charge (carries the order id).
    pub metadata: HashMap<String, String>,
}

/// A successful capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeOutcome {
    /// Provider-side charge identifier.
    pub charge_id: String,
}

/// Errors from payment capture.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// The provider refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The provider could not be reached or answered with an error.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Abstraction over payment providers.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Capture payment for a checkout.
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome, PaymentError>;

    /// Human-readable name of this gateway backend.
    fn gateway_name(&self) -> &str;
}
