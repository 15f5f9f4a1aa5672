//! Account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tamarind_core::{Email, UserId};

/// A shopper/admin account.
///
/// `reset_token` and `reset_token_expiry` are transient password-reset
/// state, cleared when the reset completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
}

impl User {
    /// Whether `token` matches an unexpired reset token on this account.
    #[must_use]
    pub fn reset_token_valid(&self, token: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token, self.reset_token_expiry) {
            (Some(stored), Some(expiry)) => stored == token && expiry > now,
            _ => false,
        }
    }
}
