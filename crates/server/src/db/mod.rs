//! Account storage.
//!
//! # Collections
//!
//! - `accounts.user` - Registered users, unique on `email` and `username`
//! - `accounts.admin` - Administrators, unique on `email`
//!
//! The unique indexes are the authoritative guard against duplicate
//! accounts. Services check for an existing account first to give a clean
//! error, but a racing insert that slips past the check still fails here
//! with [`RepositoryError::Conflict`].
//!
//! # Implementations
//!
//! - [`PgAccountStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryAccountStore`] - in-process, same uniqueness contract (tests, local runs)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p user-apis-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use user_apis_core::{Email, UserId, Username};

use crate::models::{Admin, NewAdmin, NewUser, User};

pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violation (duplicate key).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store has been closed.
    #[error("store is closed")]
    Closed,
}

/// Persistent collections of user and admin accounts.
///
/// Implementations must enforce uniqueness atomically on insert: of two
/// concurrent inserts with the same unique key, exactly one succeeds and the
/// other returns [`RepositoryError::Conflict`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Whether a user with this email or this username exists.
    async fn user_exists(&self, email: &Email, username: &Username)
    -> Result<bool, RepositoryError>;

    /// Insert a new user. Fails with `Conflict` on a duplicate email or username.
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Look up a user and their password hash by email.
    async fn find_user_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Get a user by ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// List all users, oldest first.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Whether an admin with this email exists.
    async fn admin_exists(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Insert a new (active) admin. Fails with `Conflict` on a duplicate email.
    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin, RepositoryError>;

    /// Look up an admin and their password hash by email.
    async fn find_admin_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Admin, String)>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Release the underlying connections. Further calls fail.
    async fn close(&self);
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
