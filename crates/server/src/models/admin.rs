//! Admin domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use user_apis_core::{AdminId, Email};

/// An administrator account (sanitized, safe to serialize).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Store-assigned admin ID.
    pub id: AdminId,
    /// Unique, normalized email address.
    pub email: Email,
    /// Inactive admins cannot log in.
    pub is_active: bool,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
}

/// A validated admin ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: Email,
    /// Argon2 PHC string, never the plaintext.
    pub password_hash: String,
}
