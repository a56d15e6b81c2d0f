//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse for AppError` impl and the `ApiErrorResponse` body live
//! in `agora-core` alongside `AppError` itself — the orphan rule requires the
//! foreign-trait impl to sit with the type it is implemented for. This module
//! re-exports the response body so `agora_api::error` remains the API-layer
//! entry point for error mapping.

pub use agora_core::error::ApiErrorResponse;
