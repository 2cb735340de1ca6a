//! Authentication service.
//!
//! Registration: validate → uniqueness check → hash → persist → issue token.
//! Login: validate → lookup → verify → issue token.
//!
//! The uniqueness check before insert only produces a friendlier early
//! error; the store's unique constraint decides races.

mod error;
pub mod password;
pub mod token;
pub mod validation;

pub use error::AuthError;
pub use password::PasswordCodec;
pub use token::{Claims, TokenIssuer};
pub use validation::{
    FieldViolation, LoginRequest, RegisterAdminRequest, RegisterUserRequest, ValidationErrors,
};

use serde_json::{Map, Value};

use user_apis_core::{Email, Role, Username};

use crate::db::AccountStore;
use crate::models::{Admin, NewAdmin, NewUser, User};
use validation::{EMAIL_MESSAGE, LOGIN_RULES, REGISTER_ADMIN_RULES, REGISTER_USER_RULES, validate};

/// An account together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct Session<A> {
    pub account: A,
    pub token: String,
}

/// Authentication service.
///
/// Borrows the shared store handle, password codec and token issuer for the
/// duration of one request.
pub struct AuthService<'a> {
    store: &'a dyn AccountStore,
    codec: &'a PasswordCodec,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        store: &'a dyn AccountStore,
        codec: &'a PasswordCodec,
        tokens: &'a TokenIssuer,
    ) -> Self {
        Self {
            store,
            codec,
            tokens,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every rule the request broke.
    /// Returns `AuthError::AlreadyExists` if the email or username is taken.
    pub async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<Session<User>, AuthError> {
        validate(&request, REGISTER_USER_RULES)?;
        let email = parse_email(&request.email)?;
        let username = Username::parse(&request.username).map_err(|_| {
            ValidationErrors::single("username", "Username must be between 3 and 30 characters")
        })?;

        if self.store.user_exists(&email, &username).await? {
            tracing::info!(%email, %username, "Registration rejected: user exists");
            return Err(AuthError::AlreadyExists { role: Role::User });
        }

        let password_hash = self.codec.hash_blocking(request.password).await?;

        let user = self
            .store
            .insert_user(NewUser {
                full_name: request.full_name.trim().to_owned(),
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| AuthError::from_insert(Role::User, e))?;

        let token = self.user_token(&user)?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(Session {
            account: user,
            token,
        })
    }

    /// Register a new admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every rule the request broke.
    /// Returns `AuthError::AlreadyExists` if the email is taken.
    pub async fn register_admin(
        &self,
        request: RegisterAdminRequest,
    ) -> Result<Session<Admin>, AuthError> {
        validate(&request, REGISTER_ADMIN_RULES)?;
        let email = parse_email(&request.email)?;

        if self.store.admin_exists(&email).await? {
            tracing::info!(%email, "Admin signup rejected: admin exists");
            return Err(AuthError::AlreadyExists { role: Role::Admin });
        }

        let password_hash = self.codec.hash_blocking(request.password).await?;

        let admin = self
            .store
            .insert_admin(NewAdmin {
                email,
                password_hash,
            })
            .await
            .map_err(|e| AuthError::from_insert(Role::Admin, e))?;

        let token = self.admin_token(&admin)?;
        tracing::info!(admin_id = %admin.id, "Admin registered");

        Ok(Session {
            account: admin,
            token,
        })
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login as a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed request.
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a wrong
    /// password, indistinguishably.
    pub async fn login_user(&self, request: LoginRequest) -> Result<Session<User>, AuthError> {
        validate(&request, LOGIN_RULES)?;
        let email = parse_email(&request.email)?;

        let Some((user, password_hash)) = self.store.find_user_credentials(&email).await? else {
            self.codec.verify_absent_blocking(request.password).await?;
            tracing::debug!("Login failed: unknown user email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .codec
            .verify_blocking(request.password, password_hash)
            .await?
        {
            tracing::debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.user_token(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            account: user,
            token,
        })
    }

    /// Login as an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed request.
    /// Returns `AuthError::InvalidCredentials` for an unknown email, a wrong
    /// password or an inactive admin, indistinguishably.
    pub async fn login_admin(&self, request: LoginRequest) -> Result<Session<Admin>, AuthError> {
        validate(&request, LOGIN_RULES)?;
        let email = parse_email(&request.email)?;

        let Some((admin, password_hash)) = self.store.find_admin_credentials(&email).await? else {
            self.codec.verify_absent_blocking(request.password).await?;
            tracing::debug!("Admin login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .codec
            .verify_blocking(request.password, password_hash)
            .await?
        {
            tracing::debug!(admin_id = %admin.id, "Admin login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !admin.is_active {
            tracing::warn!(admin_id = %admin.id, "Admin login refused: account inactive");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.admin_token(&admin)?;
        tracing::info!(admin_id = %admin.id, "Admin logged in");

        Ok(Session {
            account: admin,
            token,
        })
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    fn user_token(&self, user: &User) -> Result<String, AuthError> {
        let mut extra = Map::new();
        extra.insert(
            "username".to_owned(),
            Value::String(user.username.as_str().to_owned()),
        );
        extra.insert("fullname".to_owned(), Value::String(user.full_name.clone()));

        Ok(self
            .tokens
            .issue(&user.id, &user.email, Role::User, Some(extra))?)
    }

    fn admin_token(&self, admin: &Admin) -> Result<String, AuthError> {
        Ok(self.tokens.issue(&admin.id, &admin.email, Role::Admin, None)?)
    }
}

/// Parse an email that already passed the rule list.
fn parse_email(raw: &str) -> Result<Email, ValidationErrors> {
    Email::parse(raw).map_err(|_| ValidationErrors::single("email", EMAIL_MESSAGE))
}
