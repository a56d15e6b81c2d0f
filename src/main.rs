//! Agora Server — content & discussion platform backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use agora_api::state::AppState;
use agora_auth::cleanup::SessionSweeper;
use agora_auth::identity::IdentityResolver;
use agora_auth::password::{PasswordHasher, PasswordValidator};
use agora_auth::service::AuthService;
use agora_auth::store::{PgSessionStore, PgUserStore, SessionStore, UserStore};
use agora_auth::token::TokenCodec;
use agora_core::config::AppConfig;
use agora_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("AGORA_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Agora v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db = agora_database::DatabasePool::connect(&config.database).await?;
    agora_database::migration::run_migrations(db.pool()).await?;

    // ── Repositories and stores ──────────────────────────────────
    let user_repo = Arc::new(agora_database::repositories::UserRepository::new(
        db.pool().clone(),
    ));
    let session_repo = Arc::new(agora_database::repositories::SessionRepository::new(
        db.pool().clone(),
    ));

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(user_repo));
    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(session_repo));

    // ── Auth system ──────────────────────────────────────────────
    let token_codec = Arc::new(TokenCodec::new(&config.auth)?);
    let password_hasher = Arc::new(PasswordHasher::new(&config.auth));
    let password_validator = PasswordValidator::new(&config.auth);

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&users),
        Arc::clone(&sessions),
        Arc::clone(&token_codec),
        password_hasher,
        password_validator,
    ));
    let identity_resolver = Arc::new(IdentityResolver::new(Arc::clone(&users)));
    let rate_limiter = Arc::new(agora_api::middleware::rate_limit::RateLimiter::new(
        config.rate_limit.clone(),
    ));

    // ── Shutdown channel + background sweeper ────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = SessionSweeper::new(Arc::clone(&sessions));
    let sweeper_handle = sweeper.spawn(
        config.session.cleanup_interval_minutes,
        shutdown_rx.clone(),
    );
    tracing::info!(
        interval_minutes = config.session.cleanup_interval_minutes,
        "Session sweeper started"
    );

    // ── HTTP server ──────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let shutdown_grace = config.server.shutdown_grace_seconds;

    let app_state = AppState {
        config: Arc::new(config),
        auth_service,
        token_codec,
        identity_resolver,
        rate_limiter,
        users,
        sessions,
    };

    let app = agora_api::router::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Agora server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Wait for background tasks ────────────────────────────────
    let _ = tokio::time::timeout(
        std::time::Duration::from_secs(shutdown_grace),
        sweeper_handle,
    )
    .await;

    db.close().await;
    tracing::info!("Agora server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
