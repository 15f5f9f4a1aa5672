//! Unified error handling for the shop domain.
//!
//! Every service entry point returns `Result<T, ShopError>` (auth operations
//! return the more specific `AuthError`, which folds into `ShopError` at the
//! boundary). Validation failures carry the submitted input so the caller
//! can re-display the form; everything else propagates to the caller's
//! top-level failure handler. No operation retries automatically.

use thiserror::Error;

use crate::assets::AssetError;
use crate::db::RepositoryError;
use crate::models::product::ValidationError;
use crate::payment::PaymentError;
use crate::services::auth::AuthError;

/// Application-level error type for the shop domain.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Submitted input failed validation. Carries the echoed input and
    /// per-field messages for re-display.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Resource lookup miss (product, order, user).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ownership mismatch on a protected resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Document store operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Payment capture failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Image asset store operation failed.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Result type alias for `ShopError`.
pub type Result<T> = std::result::Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_error_display() {
        let err = ShopError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = ShopError::Forbidden("order 7".to_string());
        assert_eq!(err.to_string(), "Forbidden: order 7");
    }

    #[test]
    fn test_repository_error_folds_in() {
        let err: ShopError = RepositoryError::NotFound.into();
        assert!(matches!(err, ShopError::Repository(_)));
    }
}
