//! # agora-api
//!
//! HTTP API layer for Agora built on Axum.
//!
//! Provides the auth/session REST endpoints, middleware (rate limiting,
//! request logging), authorization gates, extractors, DTOs, and error
//! mapping. Content CRUD endpoints live outside this repository and
//! consume the same gates and rate-limit policies.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
