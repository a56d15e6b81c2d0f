//! Authentication and token configuration.

use serde::{Deserialize, Serialize};

/// Authentication, token, and credential configuration.
///
/// Access and refresh tokens each have their own secret and their own
/// audience tag so that one kind can never be replayed as the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access token signing (HMAC-SHA256).
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// Secret key for refresh token signing (HMAC-SHA256).
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Token issuer claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Audience tag for access tokens.
    #[serde(default = "default_access_audience")]
    pub access_audience: String,
    /// Audience tag for refresh tokens.
    #[serde(default = "default_refresh_audience")]
    pub refresh_audience: String,
    /// Access token TTL as a duration string (`<integer><unit>`, unit one
    /// of s/m/h/d/w).
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl: String,
    /// Refresh token TTL as a duration string.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl: String,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 lane count.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            refresh_token_secret: default_refresh_secret(),
            issuer: default_issuer(),
            access_audience: default_access_audience(),
            refresh_audience: default_refresh_audience(),
            access_token_ttl: default_access_ttl(),
            refresh_token_ttl: default_refresh_ttl(),
            password_min_length: default_password_min(),
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_IN_PRODUCTION".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_IN_PRODUCTION".to_string()
}

fn default_issuer() -> String {
    "agora".to_string()
}

fn default_access_audience() -> String {
    "agora:access".to_string()
}

fn default_refresh_audience() -> String {
    "agora:refresh".to_string()
}

fn default_access_ttl() -> String {
    "15m".to_string()
}

fn default_refresh_ttl() -> String {
    "7d".to_string()
}

fn default_password_min() -> usize {
    8
}

// Defaults sized so a hash lands around the 100ms mark on commodity
// hardware; tunable downward for tests.
fn default_argon2_memory() -> u32 {
    65536
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    2
}
