//! # agora-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for the Agora auth core.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
