//! Authentication error type.

use thiserror::Error;

use tamarind_core::EmailError;

use crate::db::RepositoryError;

/// Errors from account operations.
///
/// Login failures are deliberately collapsed into one variant so a caller
/// cannot distinguish "unknown email" from "wrong password".
#[derive(Debug, Error)]
pub enum AuthError {
    /// The submitted email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Email/password pair did not match an account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// The submitted password does not meet the minimum requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Password reset requested for an email with no account.
    #[error("no account with this email")]
    UnknownEmail,

    /// The reset token is unknown or expired.
    #[error("invalid or expired password reset token")]
    InvalidResetToken,

    /// Password hashing or verification failed internally.
    #[error("password hashing failed")]
    PasswordHash,

    /// Account store operation failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
