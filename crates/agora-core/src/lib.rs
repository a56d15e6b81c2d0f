//! # agora-core
//!
//! Core crate for the Agora platform backend. Contains configuration
//! schemas, the unified error system, and shared helpers.
//!
//! This crate has **no** internal dependencies on other Agora crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
