//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use user_apis_core::{Email, UserId, Username};

/// A registered user (sanitized, safe to serialize).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned user ID.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Unique, normalized username.
    pub username: Username,
    /// Unique, normalized email address.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// A validated user ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: Username,
    pub email: Email,
    /// Argon2 PHC string, never the plaintext.
    pub password_hash: String,
}
