//! In-process account store.
//!
//! Mirrors the `PostgreSQL` store's contract: uniqueness is checked and the
//! record inserted under one lock, so concurrent duplicates resolve to exactly
//! one success and one [`RepositoryError::Conflict`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use user_apis_core::{AdminId, Email, UserId, Username};

use super::{AccountStore, RepositoryError};
use crate::models::{Admin, NewAdmin, NewUser, User};

/// Account store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Collections>,
}

#[derive(Debug, Default)]
struct Collections {
    closed: bool,
    users: Vec<(User, String)>,
    admins: Vec<(Admin, String)>,
    next_user_id: i32,
    next_admin_id: i32,
}

impl MemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an admin active or inactive. Returns `false` if no such admin.
    pub fn set_admin_active(&self, email: &Email, active: bool) -> bool {
        let mut inner = self.lock();
        inner
            .admins
            .iter_mut()
            .find(|(admin, _)| &admin.email == email)
            .map(|(admin, _)| admin.is_active = active)
            .is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        let inner = self.lock();
        if inner.closed {
            return Err(RepositoryError::Closed);
        }
        Ok(inner)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn user_exists(
        &self,
        email: &Email,
        username: &Username,
    ) -> Result<bool, RepositoryError> {
        let inner = self.open()?;
        Ok(inner
            .users
            .iter()
            .any(|(user, _)| &user.email == email || &user.username == username))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.open()?;

        if inner.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("user_email_key".to_owned()));
        }
        if inner.users.iter().any(|(u, _)| u.username == user.username) {
            return Err(RepositoryError::Conflict("user_username_key".to_owned()));
        }

        inner.next_user_id += 1;
        let created = User {
            id: UserId::new(inner.next_user_id),
            full_name: user.full_name,
            username: user.username,
            email: user.email,
            created_at: Utc::now(),
        };
        inner.users.push((created.clone(), user.password_hash));

        Ok(created)
    }

    async fn find_user_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.open()?;
        Ok(inner
            .users
            .iter()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.open()?;
        Ok(inner
            .users
            .iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let inner = self.open()?;
        Ok(inner.users.iter().map(|(user, _)| user.clone()).collect())
    }

    async fn admin_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let inner = self.open()?;
        Ok(inner.admins.iter().any(|(admin, _)| &admin.email == email))
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin, RepositoryError> {
        let mut inner = self.open()?;

        if inner.admins.iter().any(|(a, _)| a.email == admin.email) {
            return Err(RepositoryError::Conflict("admin_email_key".to_owned()));
        }

        inner.next_admin_id += 1;
        let created = Admin {
            id: AdminId::new(inner.next_admin_id),
            email: admin.email,
            is_active: true,
            created_at: Utc::now(),
        };
        inner.admins.push((created.clone(), admin.password_hash));

        Ok(created)
    }

    async fn find_admin_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Admin, String)>, RepositoryError> {
        let inner = self.open()?;
        Ok(inner
            .admins
            .iter()
            .find(|(admin, _)| &admin.email == email)
            .cloned())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.open().map(|_| ())
    }

    async fn close(&self) {
        self.lock().closed = true;
    }
}
