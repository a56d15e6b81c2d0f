//! Store traits at the seams of the auth core.
//!
//! The service and the request pipeline depend on these traits rather
//! than on concrete repositories, so tests can substitute the in-memory
//! implementations and production wires the Postgres-backed ones.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use agora_core::AppResult;
use agora_entity::session::{NewSession, Session};
use agora_entity::user::{NewUser, User};

pub use memory::{MemorySessionStore, MemoryUserStore};
pub use postgres::{PgSessionStore, PgUserStore};

/// Read-mostly access to user records.
///
/// The auth core never mutates role or status through this trait; those
/// transitions belong to the moderation surface.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Replace a user's password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Record a successful login.
    async fn update_last_login(&self, id: Uuid) -> AppResult<()>;
}

/// Durable record of outstanding refresh sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new active session.
    async fn create(&self, session: NewSession) -> AppResult<Session>;

    /// Find a session by id regardless of state.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Find the session for a refresh-token digest, only if it is active
    /// and unexpired.
    async fn find_active_by_refresh_hash(&self, hash: &str) -> AppResult<Option<Session>>;

    /// List a user's active, unexpired sessions.
    async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<Session>>;

    /// List all active, unexpired sessions.
    async fn find_all_active(&self) -> AppResult<Vec<Session>>;

    /// Update client metadata and last-seen time.
    async fn touch(&self, id: Uuid, ip_address: &str, user_agent: Option<&str>) -> AppResult<()>;

    /// Mark a session inactive. Idempotent.
    async fn invalidate(&self, id: Uuid) -> AppResult<()>;

    /// Mark all of a user's sessions inactive. Idempotent. Returns the
    /// number of sessions newly invalidated.
    async fn invalidate_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete all rows that are expired or inactive. Returns the number
    /// of rows removed.
    async fn sweep_expired(&self) -> AppResult<u64>;
}
