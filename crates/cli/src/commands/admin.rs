//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! ua-cli admin create -e admin@example.com -p 'Str0ngPassword'
//! ```
//!
//! The admin goes through the same validation and hashing as
//! `POST /admin/signup`. An existing admin with the same email is an error.
//!
//! # Environment Variables
//!
//! Same as the server: `API_DATABASE_URL` and `JWT_SECRET` are required.

use std::sync::Arc;

use thiserror::Error;

use user_apis_core::{AdminId, Role};
use user_apis_server::config::{ConfigError, ServerConfig};
use user_apis_server::db::{self, AccountStore, PgAccountStore};
use user_apis_server::services::auth::{AuthError, RegisterAdminRequest};
use user_apis_server::state::AppState;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Email or password broke a rule.
    #[error("Invalid admin details: {0}")]
    Invalid(String),

    /// Admin already exists.
    #[error("Admin already exists with email: {0}")]
    AlreadyExists(String),

    /// Registration failed for another reason.
    #[error("Admin registration failed: {0}")]
    Auth(AuthError),
}

impl AdminError {
    fn from_auth(email: &str, err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::Invalid(
                errors
                    .violations()
                    .iter()
                    .map(|v| format!("{}: {}", v.field, v.message))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            AuthError::AlreadyExists { role: Role::Admin } => {
                Self::AlreadyExists(email.trim().to_lowercase())
            }
            other => Self::Auth(other),
        }
    }
}

/// Create a new admin account.
///
/// # Returns
///
/// The ID of the created admin.
///
/// # Errors
///
/// Returns `AdminError::AlreadyExists` if the email is taken, `Invalid` if
/// validation fails, or a configuration/database error.
pub async fn create(email: &str, password: &str) -> Result<AdminId, AdminError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    let store: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool));
    let state = AppState::new(config, Arc::clone(&store));

    tracing::info!("Creating admin: {}", email.trim());
    let result = state
        .auth()
        .register_admin(RegisterAdminRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        })
        .await;
    store.close().await;

    let session = result.map_err(|e| AdminError::from_auth(email, e))?;

    tracing::info!(
        "Admin created successfully! ID: {}, Email: {}",
        session.account.id,
        session.account.email
    );

    Ok(session.account.id)
}

#[cfg(test)]
mod tests {
    use user_apis_server::db::RepositoryError;
    use user_apis_server::services::auth::ValidationErrors;

    use super::*;

    #[test]
    fn test_existing_admin_is_reported_as_error() {
        let err = AdminError::from_auth(
            " Root@Example.com ",
            AuthError::AlreadyExists { role: Role::Admin },
        );
        assert!(matches!(err, AdminError::AlreadyExists(ref e) if e == "root@example.com"));
        assert_eq!(
            err.to_string(),
            "Admin already exists with email: root@example.com"
        );
    }

    #[test]
    fn test_validation_lists_each_violation() {
        let err = AdminError::from_auth(
            "bad",
            AuthError::Validation(ValidationErrors::single(
                "email",
                "Please provide a valid email address",
            )),
        );
        assert_eq!(
            err.to_string(),
            "Invalid admin details: email: Please provide a valid email address"
        );
    }

    #[test]
    fn test_store_errors_pass_through() {
        let err =
            AdminError::from_auth("a@x.com", AuthError::Repository(RepositoryError::Closed));
        assert!(matches!(err, AdminError::Auth(_)));
    }
}
