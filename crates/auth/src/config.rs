//! Process-wide authentication configuration.
//!
//! Built once at startup, shared behind an `Arc` and never mutated. Rotating
//! the signing secret (restarting with a new one) invalidates every token
//! issued before.

use std::time::Duration as StdDuration;

use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;
/// Upper bound on the token TTL (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 366 * 24 * 60 * 60;
pub const DEFAULT_LOOKUP_TIMEOUT: StdDuration = StdDuration::from_secs(5);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("token TTL must be positive")]
    NonPositiveTtl,

    #[error("token TTL must not exceed {} seconds", MAX_TOKEN_TTL_SECS)]
    TtlTooLong,

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Symmetric key used to sign and verify tokens.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    secret: SigningSecret,
    token_ttl: Duration,
    lookup_timeout: StdDuration,
}

impl AuthConfig {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Result<Self, ConfigError> {
        if ttl <= Duration::zero() {
            return Err(ConfigError::NonPositiveTtl);
        }
        if ttl > Duration::seconds(MAX_TOKEN_TTL_SECS) {
            return Err(ConfigError::TtlTooLong);
        }
        self.token_ttl = ttl;
        Ok(self)
    }

    pub fn with_lookup_timeout(mut self, timeout: StdDuration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn secret(&self) -> &SigningSecret {
        &self.secret
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn lookup_timeout(&self) -> StdDuration {
        self.lookup_timeout
    }
}
