//! In-memory store implementations.
//!
//! Used by the test suite and available for local development without a
//! database. Not suitable for multi-instance deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::{AppError, AppResult};
use agora_entity::session::{NewSession, Session};
use agora_entity::user::{NewUser, User, UserStatus};

use super::{SessionStore, UserStore};

/// In-memory [`UserStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directly set a user's status, standing in for the moderation
    /// surface that owns status transitions in production.
    pub async fn set_status(&self, id: Uuid, status: UserStatus) {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.status = status;
            user.updated_at = Utc::now();
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        let email = data.email.trim().to_lowercase();
        if users.values().any(|u| u.email == email) {
            return Err(AppError::conflict("Email already in use"));
        }
        if users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict(format!(
                "Username '{}' already taken",
                data.username
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            username: data.username,
            password_hash: data.password_hash,
            role: data.role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// In-memory [`SessionStore`].
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, data: NewSession) -> AppResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            refresh_token_hash: data.refresh_token_hash,
            active: true,
            ip_address: data.ip_address,
            user_agent: data.user_agent,
            created_at: now,
            expires_at: data.expires_at,
            last_seen_at: now,
        };
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_active_by_refresh_hash(&self, hash: &str) -> AppResult<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.refresh_token_hash == hash && s.is_usable())
            .cloned())
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id && s.is_usable())
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn find_all_active(&self) -> AppResult<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_usable())
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn touch(&self, id: Uuid, ip_address: &str, user_agent: Option<&str>) -> AppResult<()> {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.ip_address = ip_address.to_string();
            session.user_agent = user_agent.map(String::from);
            session.last_seen_at = Utc::now();
        }
        Ok(())
    }

    async fn invalidate(&self, id: Uuid) -> AppResult<()> {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.active = false;
        }
        Ok(())
    }

    async fn invalidate_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut count = 0u64;
        for session in self.sessions.write().await.values_mut() {
            if session.user_id == user_id && session.active {
                session.active = false;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, s| s.active && s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
