//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;

use declarant_auth::{AuthConfig, ConfigError, SigningSecret};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

const INSECURE_DEV_SECRET: &str = "dev-secret";

/// Administrator registered at startup if its document number is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub full_name: String,
    pub document_number: String,
    /// Falls back to the derived default secret when absent.
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub bind_addr: SocketAddr,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            bootstrap_admin: None,
        }
    }

    pub fn with_bootstrap_admin(mut self, admin: BootstrapAdmin) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    ///
    /// Keys: `JWT_SECRET`, `JWT_TTL_SECS`, `AUTH_LOOKUP_TIMEOUT_MS`,
    /// `BIND_ADDR`, `BOOTSTRAP_ADMIN_NAME`, `BOOTSTRAP_ADMIN_DOCUMENT`,
    /// `BOOTSTRAP_ADMIN_PASSWORD`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            INSECURE_DEV_SECRET.to_string()
        });

        let mut auth = AuthConfig::new(SigningSecret::new(secret)?);

        if let Some(raw) = lookup("JWT_TTL_SECS") {
            let secs: i64 = parse("JWT_TTL_SECS", &raw)?;
            let ttl = chrono::Duration::try_seconds(secs).ok_or_else(|| ConfigError::Invalid {
                key: "JWT_TTL_SECS",
                reason: format!("{secs} seconds is out of range"),
            })?;
            auth = auth.with_token_ttl(ttl)?;
        }

        if let Some(raw) = lookup("AUTH_LOOKUP_TIMEOUT_MS") {
            let millis: u64 = parse("AUTH_LOOKUP_TIMEOUT_MS", &raw)?;
            auth = auth.with_lookup_timeout(Duration::from_millis(millis));
        }

        let bind_addr = parse(
            "BIND_ADDR",
            &lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let bootstrap_admin = lookup("BOOTSTRAP_ADMIN_DOCUMENT").map(|document_number| BootstrapAdmin {
            full_name: lookup("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
            document_number,
            password: lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        });

        Ok(Self {
            auth,
            bind_addr,
            bootstrap_admin,
        })
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
