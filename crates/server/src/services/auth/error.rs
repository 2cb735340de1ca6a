//! Authentication error types.

use thiserror::Error;

use user_apis_core::Role;

use super::validation::ValidationErrors;
use crate::db::RepositoryError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request failed one or more validation rules.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// An account with the same unique key already exists.
    ///
    /// Deliberately does not say which key collided.
    #[error("{role} already exists")]
    AlreadyExists {
        /// Collection the conflict happened in.
        role: Role,
    },

    /// Unknown email, wrong password, or inactive account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error("token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Convert a store error from an insert, turning duplicate keys into a conflict.
    pub(crate) fn from_insert(role: Role, err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(constraint) => {
                tracing::info!(%role, %constraint, "Insert rejected by unique constraint");
                Self::AlreadyExists { role }
            }
            other => Self::Repository(other),
        }
    }
}
