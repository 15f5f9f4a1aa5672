//! Account management: signup, login, password reset.
//!
//! Passwords are stored as Argon2id hashes. Password resets are a
//! two-step flow: `start_password_reset` mints a random token with a
//! one-hour expiry (the caller delivers it to the user, typically by
//! email), `finish_password_reset` exchanges a still-valid token for a new
//! password and burns the token.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use rand::RngCore;

use tamarind_core::Email;

use crate::db::RepositoryError;
use crate::models::user::User;
use crate::stores::UserStore;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a password-reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// A freshly minted password-reset token for delivery to the user.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub token: String,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Account signup, login and password-reset flows.
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    /// Create an auth service.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address,
    /// `AuthError::WeakPassword` for a too-short password and
    /// `AuthError::EmailTaken` when the address is already registered.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let hash = hash_password(password)?;
        match self.users.insert(&email, &hash).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account created");
                Ok(user)
            }
            Err(RepositoryError::Conflict(_)) => Err(AuthError::EmailTaken),
            Err(err) => Err(err.into()),
        }
    }

    /// Verify an email/password pair and return the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when either the email is
    /// unknown or the password does not match, without revealing which.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let parsed = PasswordHash::new(&user.password_hash).map_err(|_| AuthError::PasswordHash)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, "login succeeded");
        Ok(user)
    }

    /// Start a password reset for the account behind `email`.
    ///
    /// Stores the token on the account and returns it with its expiry for
    /// delivery to the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownEmail` when no account matches.
    pub async fn start_password_reset(&self, email: &str) -> Result<PasswordReset, AuthError> {
        let email = Email::parse(email)?;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Err(AuthError::UnknownEmail);
        };

        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        self.users
            .set_reset_token(user.id, &token, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "password reset started");
        Ok(PasswordReset { token, expires_at })
    }

    /// Complete a password reset.
    ///
    /// The token is single use: setting the new password clears it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetToken` for an unknown or expired
    /// token and `AuthError::WeakPassword` for a too-short replacement.
    pub async fn finish_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let Some(user) = self.users.get_by_reset_token(token).await? else {
            return Err(AuthError::InvalidResetToken);
        };
        if !user.reset_token_valid(token, Utc::now()) {
            return Err(AuthError::InvalidResetToken);
        }

        let hash = hash_password(new_password)?;
        self.users.set_password(user.id, &hash).await?;

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(())
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// A 256-bit hex token.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
