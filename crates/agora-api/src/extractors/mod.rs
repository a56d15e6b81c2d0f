//! Custom Axum extractors.

pub mod auth;
pub mod client_meta;

pub use auth::{AuthUser, MaybeAuthUser};
pub use client_meta::ClientMeta;
