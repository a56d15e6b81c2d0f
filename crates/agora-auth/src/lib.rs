//! # agora-auth
//!
//! Authentication and session lifecycle core for the Agora platform.
//!
//! ## Modules
//!
//! - `password` — Argon2id password hashing and policy enforcement
//! - `token` — signed access/refresh token issuance and verification
//! - `store` — user/session store traits with in-memory and Postgres impls
//! - `service` — the login/refresh/logout state machine
//! - `identity` — live-state identity resolution for the request pipeline
//! - `cleanup` — periodic expired-session sweeping

pub mod cleanup;
pub mod identity;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use cleanup::SessionSweeper;
pub use identity::IdentityResolver;
pub use password::{PasswordHasher, PasswordValidator};
pub use service::{AuthService, LoginOutcome, RefreshOutcome, TokenGrant};
pub use store::{SessionStore, UserStore};
pub use token::TokenCodec;
