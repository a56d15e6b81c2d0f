//! Keyed, windowed request counters with per-endpoint policies and
//! progressive blocking for repeat violators.
//!
//! Counters are process-local by design: a horizontally scaled deployment
//! under-counts slightly across instances, which is the documented
//! trade-off for keeping the hot path free of shared-store round trips.

use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;

use agora_core::config::{RateKey, RateLimitConfig};
use agora_core::error::{AppError, ErrorKind};

use crate::extractors::client_meta::client_ip;
use crate::state::AppState;

/// Fixed-window counter state for one (policy, key) pair.
#[derive(Debug, Clone)]
struct WindowCounter {
    count: u32,
    window_start: Instant,
}

/// Violation history for one client IP.
#[derive(Debug, Clone)]
struct ViolationRecord {
    count: u32,
    blocked_until: Option<Instant>,
}

/// Process-local rate limiter.
///
/// Each check is an atomic increment-and-compare on the counter for the
/// policy/key pair; no cross-key locking.
pub struct RateLimiter {
    config: RateLimitConfig,
    counters: DashMap<(String, String), WindowCounter>,
    violations: DashMap<String, ViolationRecord>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish()
    }
}

impl RateLimiter {
    /// Creates a new limiter from configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: DashMap::new(),
            violations: DashMap::new(),
        }
    }

    /// Checks one request against a policy.
    ///
    /// `identity_key` is the subject id when the request carries a valid
    /// access token; IP-keyed policies ignore it so a per-account limit
    /// cannot be reset by logging out.
    pub fn check(
        &self,
        policy_name: &str,
        identity_key: Option<&str>,
        ip: &str,
    ) -> Result<(), AppError> {
        self.check_at(Instant::now(), policy_name, identity_key, ip)
    }

    fn check_at(
        &self,
        now: Instant,
        policy_name: &str,
        identity_key: Option<&str>,
        ip: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            return Ok(());
        }
        let Some(policy) = self.config.policy(policy_name) else {
            return Ok(());
        };

        // An escalated lockout blocks everything, independent of the
        // normal counters.
        if self.config.escalation.enabled {
            if let Some(record) = self.violations.get(ip) {
                if let Some(blocked_until) = record.blocked_until {
                    if now < blocked_until {
                        let retry = blocked_until.duration_since(now).as_secs().max(1);
                        return Err(AppError::new(
                            ErrorKind::IpBlocked,
                            "Too many violations; this address is temporarily blocked",
                        )
                        .with_retry_after(retry));
                    }
                }
            }
        }

        let key = match policy.key {
            RateKey::Ip => ip,
            RateKey::Identity => identity_key.unwrap_or(ip),
        };
        let window = Duration::from_secs(policy.window_seconds);

        let mut counter = self
            .counters
            .entry((policy_name.to_string(), key.to_string()))
            .or_insert_with(|| WindowCounter {
                count: 0,
                window_start: now,
            });

        let elapsed = now.duration_since(counter.window_start);
        if elapsed >= window {
            counter.count = 0;
            counter.window_start = now;
        }

        counter.count += 1;
        if counter.count <= policy.max_requests {
            return Ok(());
        }

        let retry = window
            .saturating_sub(now.duration_since(counter.window_start))
            .as_secs()
            .max(1);
        drop(counter);

        tracing::warn!(
            target: "security",
            policy = policy_name,
            key = %key,
            ip = %ip,
            "Rate limit exceeded"
        );

        if policy.escalate && self.config.escalation.enabled {
            if let Some(err) = self.record_violation(now, ip) {
                return Err(err);
            }
        }

        Err(
            AppError::new(ErrorKind::RateLimitExceeded, "Too many requests")
                .with_retry_after(retry),
        )
    }

    /// Records a violation for an IP and, past the threshold, starts a
    /// lockout whose duration doubles with each further violation, capped
    /// at the configured maximum.
    fn record_violation(&self, now: Instant, ip: &str) -> Option<AppError> {
        let escalation = &self.config.escalation;

        let mut record = self
            .violations
            .entry(ip.to_string())
            .or_insert_with(|| ViolationRecord {
                count: 0,
                blocked_until: None,
            });

        record.count += 1;
        if record.count < escalation.violation_threshold {
            return None;
        }

        let excess = record.count - escalation.violation_threshold;
        let factor = 2u64.saturating_pow(excess.min(32));
        let block_seconds = escalation
            .base_block_seconds
            .saturating_mul(factor)
            .min(escalation.max_block_seconds);

        record.blocked_until = Some(now + Duration::from_secs(block_seconds));

        tracing::warn!(
            target: "security",
            ip = %ip,
            violations = record.count,
            block_seconds,
            "IP temporarily blocked after repeated rate-limit violations"
        );

        Some(
            AppError::new(
                ErrorKind::IpBlocked,
                "Too many violations; this address is temporarily blocked",
            )
            .with_retry_after(block_seconds),
        )
    }
}

/// General API traffic policy.
pub async fn general(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce("general", state, request, next).await
}

/// Login/registration/refresh attempts; IP-keyed and escalating.
pub async fn auth_attempts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce("auth", state, request, next).await
}

/// Password change/reset attempts; IP-keyed and escalating.
pub async fn password_reset(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce("password_reset", state, request, next).await
}

/// Administrative operations.
pub async fn admin_ops(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce("admin", state, request, next).await
}

/// Runs the policy check before the guarded operation; a trip fails fast
/// and the handler never executes.
async fn enforce(
    policy: &'static str,
    state: AppState,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(request.headers(), request.extensions());
    let identity_key = bearer_subject(&state, &request);

    state
        .rate_limiter
        .check(policy, identity_key.as_deref(), &ip)?;

    Ok(next.run(request).await)
}

/// Best-effort subject extraction for counter keying. Invalid tokens fall
/// back to IP keying here; the auth extractor rejects them properly later.
fn bearer_subject(state: &AppState, request: &Request) -> Option<String> {
    let token = request
        .headers()
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    state
        .token_codec
        .verify_access_token(token)
        .ok()
        .map(|claims| claims.sub.to_string())
}
