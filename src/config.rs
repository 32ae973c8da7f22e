use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::room::CleanupConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 365;

/// Process-wide settings, read from the environment at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub session_expiration_days: i64,
    /// Maximum retained chat messages per room; `None` keeps everything
    pub chat_history_limit: Option<usize>,
    pub cleanup: CleanupConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
            chat_history_limit: None,
            cleanup: CleanupConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unparseable values fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cleanup = CleanupConfig {
            cleanup_interval: parse_var(&lookup, "CLEANUP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup.cleanup_interval),
            inactivity_threshold: parse_var(&lookup, "ROOM_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .or(defaults.cleanup.inactivity_threshold),
        };

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            session_expiration_days: parse_var(&lookup, "SESSION_EXPIRATION_DAYS")
                .unwrap_or(defaults.session_expiration_days),
            chat_history_limit: parse_var(&lookup, "CHAT_HISTORY_LIMIT"),
            cleanup,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}
