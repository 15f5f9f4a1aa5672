//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `SHOP_UPLOAD_DIR` - Directory for product image uploads (default: `data/images`)
//! - `SHOP_INVOICE_DIR` - Directory for cached invoice PDFs (default: `data/invoices`)
//! - `SHOP_CURRENCY` - ISO 4217 charge currency (default: `usd`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop application configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Directory where product image uploads are stored
    pub upload_dir: PathBuf,
    /// Directory where rendered invoices are cached
    pub invoice_dir: PathBuf,
    /// ISO 4217 currency code used for payment capture
    pub currency: String,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHOP_DATABASE_URL")?;
        let upload_dir = PathBuf::from(get_env_or_default("SHOP_UPLOAD_DIR", "data/images"));
        let invoice_dir = PathBuf::from(get_env_or_default("SHOP_INVOICE_DIR", "data/invoices"));

        let currency = get_env_or_default("SHOP_CURRENCY", "usd");
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_CURRENCY".to_string(),
                format!("expected a 3-letter ISO 4217 code, got {currency:?}"),
            ));
        }

        Ok(Self {
            database_url,
            upload_dir,
            invoice_dir,
            currency: currency.to_lowercase(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
