//! `PostgreSQL` account store.
//!
//! Queries are built at runtime with `query_as` + `FromRow` so the crate
//! compiles without a live database or an offline query cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use user_apis_core::{AdminId, Email, UserId, Username};

use super::{AccountStore, RepositoryError};
use crate::models::{Admin, NewAdmin, NewUser, User};

/// Account store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    full_name: String,
    username: String,
    email: Email,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: AdminId,
    email: Email,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AdminCredentialsRow {
    #[sqlx(flatten)]
    admin: AdminRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            full_name: row.full_name,
            username,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Map a unique violation to `Conflict`, everything else to `Database`.
fn map_insert_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique key").to_owned();
            return RepositoryError::Conflict(constraint);
        }
    }
    RepositoryError::Database(e)
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn user_exists(
        &self,
        email: &Email,
        username: &Username,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM accounts.user
                WHERE email = $1 OR username = $2
            )
            ",
        )
        .bind(email)
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO accounts.user (full_name, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, username, email, created_at
            ",
        )
        .bind(&user.full_name)
        .bind(user.username.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        row.try_into()
    }

    async fn find_user_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserCredentialsRow> = sqlx::query_as(
            r"
            SELECT id, full_name, username, email, created_at, password_hash
            FROM accounts.user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some((row.user.try_into()?, row.password_hash)))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, full_name, username, email, created_at
            FROM accounts.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r"
            SELECT id, full_name, username, email, created_at
            FROM accounts.user
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn admin_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar(r"SELECT EXISTS (SELECT 1 FROM accounts.admin WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin, RepositoryError> {
        let row: AdminRow = sqlx::query_as(
            r"
            INSERT INTO accounts.admin (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, is_active, created_at
            ",
        )
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(row.into())
    }

    async fn find_admin_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Admin, String)>, RepositoryError> {
        let row: Option<AdminCredentialsRow> = sqlx::query_as(
            r"
            SELECT id, email, is_active, created_at, password_hash
            FROM accounts.admin
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some((row.admin.into(), row.password_hash)))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
