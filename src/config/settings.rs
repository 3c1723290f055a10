//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_PASSWORD_MAX_LENGTH, DEFAULT_PASSWORD_MIN_CHAR_CLASSES,
    DEFAULT_PASSWORD_MIN_LENGTH, DEFAULT_REPOSITORY_TIMEOUT_MS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_USERNAME_MAX_LENGTH, DEFAULT_USERNAME_MIN_LENGTH,
    DEFAULT_USERNAME_PATTERN,
};

/// Credential policy thresholds.
///
/// Every rule the policy validator enforces is driven from here so
/// deployments can tighten or relax them without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub username_min_length: usize,
    pub username_max_length: usize,
    pub username_pattern: String,
    /// Lowercase usernames before validation and storage
    pub username_case_insensitive: bool,
    pub password_min_length: usize,
    pub password_max_length: usize,
    pub password_min_char_classes: u8,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            username_min_length: DEFAULT_USERNAME_MIN_LENGTH,
            username_max_length: DEFAULT_USERNAME_MAX_LENGTH,
            username_pattern: DEFAULT_USERNAME_PATTERN.to_string(),
            username_case_insensitive: false,
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            password_max_length: DEFAULT_PASSWORD_MAX_LENGTH,
            password_min_char_classes: DEFAULT_PASSWORD_MIN_CHAR_CLASSES,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub repository_timeout_ms: u64,
    pub policy: PolicyConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("repository_timeout_ms", &self.repository_timeout_ms)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            repository_timeout_ms: DEFAULT_REPOSITORY_TIMEOUT_MS,
            policy: PolicyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults in
    /// [`crate::config::constants`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let policy = PolicyConfig {
            username_min_length: parse_var("USERNAME_MIN_LENGTH", DEFAULT_USERNAME_MIN_LENGTH),
            username_max_length: parse_var("USERNAME_MAX_LENGTH", DEFAULT_USERNAME_MAX_LENGTH),
            username_pattern: env::var("USERNAME_PATTERN")
                .unwrap_or_else(|_| DEFAULT_USERNAME_PATTERN.to_string()),
            username_case_insensitive: parse_var("USERNAME_CASE_INSENSITIVE", false),
            password_min_length: parse_var("PASSWORD_MIN_LENGTH", DEFAULT_PASSWORD_MIN_LENGTH),
            password_max_length: parse_var("PASSWORD_MAX_LENGTH", DEFAULT_PASSWORD_MAX_LENGTH),
            password_min_char_classes: parse_var(
                "PASSWORD_MIN_CHAR_CLASSES",
                DEFAULT_PASSWORD_MIN_CHAR_CLASSES,
            ),
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT),
            repository_timeout_ms: parse_var("REPOSITORY_TIMEOUT_MS", DEFAULT_REPOSITORY_TIMEOUT_MS),
            policy,
        }
    }

    /// Bound applied to every repository call.
    pub fn repository_timeout(&self) -> Duration {
        Duration::from_millis(self.repository_timeout_ms)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable config value");
            default
        }),
        Err(_) => default,
    }
}
