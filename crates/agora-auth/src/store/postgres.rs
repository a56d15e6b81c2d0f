//! Postgres-backed store implementations wrapping the repositories.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use agora_core::AppResult;
use agora_database::repositories::{SessionRepository, UserRepository};
use agora_entity::session::{NewSession, Session};
use agora_entity::user::{NewUser, User};

use super::{SessionStore, UserStore};

/// [`UserStore`] backed by the PostgreSQL user repository.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    repo: Arc<UserRepository>,
}

impl PgUserStore {
    /// Creates a new store over the given repository.
    pub fn new(repo: Arc<UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        self.repo.create(&user).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.repo.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.repo.find_by_email(email).await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        self.repo.update_password(id, password_hash).await
    }

    async fn update_last_login(&self, id: Uuid) -> AppResult<()> {
        self.repo.update_last_login(id).await
    }
}

/// [`SessionStore`] backed by the PostgreSQL session repository.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    repo: Arc<SessionRepository>,
}

impl PgSessionStore {
    /// Creates a new store over the given repository.
    pub fn new(repo: Arc<SessionRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: NewSession) -> AppResult<Session> {
        self.repo.create(&session).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        self.repo.find_by_id(id).await
    }

    async fn find_active_by_refresh_hash(&self, hash: &str) -> AppResult<Option<Session>> {
        self.repo.find_active_by_refresh_hash(hash).await
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        self.repo.find_active_by_user(user_id).await
    }

    async fn find_all_active(&self) -> AppResult<Vec<Session>> {
        self.repo.find_all_active().await
    }

    async fn touch(&self, id: Uuid, ip_address: &str, user_agent: Option<&str>) -> AppResult<()> {
        self.repo.touch(id, ip_address, user_agent).await
    }

    async fn invalidate(&self, id: Uuid) -> AppResult<()> {
        self.repo.invalidate(id).await
    }

    async fn invalidate_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.repo.invalidate_all_for_user(user_id).await
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        self.repo.sweep_expired().await
    }
}
