//! Route definitions for the Agora HTTP API.
//!
//! All routes are mounted under `/api`. Rate-limit policies are applied
//! per route group: auth flows are IP-keyed and escalating, password
//! changes use their own tighter window, admin operations have a window
//! of their own, and everything shares the general policy.

use axum::http::{HeaderValue, Method};
use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{logging, rate_limit};
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::auth_attempts,
        ));

    let account_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/sessions", get(handlers::sessions::list_sessions))
        .route("/sessions/{id}", delete(handlers::sessions::revoke_session))
        .route("/sessions/revoke-all", post(handlers::sessions::revoke_all));

    let password_routes = Router::new()
        .route("/users/me/password", put(handlers::user::change_password))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::password_reset,
        ));

    let admin_routes = Router::new()
        .route("/admin/sessions", get(handlers::admin::list_all_sessions))
        .route(
            "/admin/sessions/cleanup",
            post(handlers::admin::cleanup_sessions),
        )
        .route(
            "/admin/users/{id}/sessions/revoke",
            post(handlers::admin::revoke_user_sessions),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::admin_ops,
        ));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(account_routes)
        .merge(password_routes)
        .merge(admin_routes)
        .route("/health", get(handlers::health::health_check))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::general,
        ));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(logging::request_logging))
        .with_state(state)
}

/// Build the CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
