//! Abuse-control configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Abuse-control configuration: windowed counters plus progressive
/// IP blocking for repeat violators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-policy window settings, keyed by policy name.
    #[serde(default = "default_policies")]
    pub policies: HashMap<String, RatePolicy>,
    /// Progressive escalation settings.
    #[serde(default)]
    pub escalation: EscalationConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policies: default_policies(),
            escalation: EscalationConfig::default(),
        }
    }
}

impl RateLimitConfig {
    /// Look up a policy by name.
    pub fn policy(&self, name: &str) -> Option<&RatePolicy> {
        self.policies.get(name)
    }
}

/// A single windowed counter policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatePolicy {
    /// Maximum requests allowed within one window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_seconds: u64,
    /// How the counter key is chosen.
    #[serde(default)]
    pub key: RateKey,
    /// Whether trips of this policy feed the progressive IP blocker.
    #[serde(default)]
    pub escalate: bool,
}

/// Counter key selection for a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateKey {
    /// Subject id when authenticated, client IP otherwise.
    #[default]
    Identity,
    /// Always the client IP, so logging out cannot reset the counter.
    Ip,
}

/// Progressive IP blocking for repeat rate-limit violators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Whether progressive blocking is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Violations tolerated before a lockout starts.
    #[serde(default = "default_violation_threshold")]
    pub violation_threshold: u32,
    /// Lockout duration for the first escalation, in seconds. Each further
    /// violation doubles it.
    #[serde(default = "default_base_block")]
    pub base_block_seconds: u64,
    /// Upper bound on the lockout duration, in seconds.
    #[serde(default = "default_max_block")]
    pub max_block_seconds: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            violation_threshold: default_violation_threshold(),
            base_block_seconds: default_base_block(),
            max_block_seconds: default_max_block(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_violation_threshold() -> u32 {
    5
}

fn default_base_block() -> u64 {
    60
}

// 24 hours.
fn default_max_block() -> u64 {
    86400
}

fn default_policies() -> HashMap<String, RatePolicy> {
    let mut map = HashMap::new();
    map.insert(
        "general".to_string(),
        RatePolicy {
            max_requests: 300,
            window_seconds: 60,
            key: RateKey::Identity,
            escalate: false,
        },
    );
    map.insert(
        "auth".to_string(),
        RatePolicy {
            max_requests: 10,
            window_seconds: 60,
            key: RateKey::Ip,
            escalate: true,
        },
    );
    map.insert(
        "content".to_string(),
        RatePolicy {
            max_requests: 30,
            window_seconds: 60,
            key: RateKey::Identity,
            escalate: false,
        },
    );
    map.insert(
        "comments".to_string(),
        RatePolicy {
            max_requests: 60,
            window_seconds: 60,
            key: RateKey::Identity,
            escalate: false,
        },
    );
    map.insert(
        "search".to_string(),
        RatePolicy {
            max_requests: 120,
            window_seconds: 60,
            key: RateKey::Identity,
            escalate: false,
        },
    );
    map.insert(
        "password_reset".to_string(),
        RatePolicy {
            max_requests: 5,
            window_seconds: 300,
            key: RateKey::Ip,
            escalate: true,
        },
    );
    map.insert(
        "uploads".to_string(),
        RatePolicy {
            max_requests: 20,
            window_seconds: 300,
            key: RateKey::Identity,
            escalate: false,
        },
    );
    map.insert(
        "admin".to_string(),
        RatePolicy {
            max_requests: 60,
            window_seconds: 60,
            key: RateKey::Identity,
            escalate: false,
        },
    );
    map
}
