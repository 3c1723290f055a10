//! Credential policy - username and password shape rules.
//!
//! Validation is pure: it never touches storage and never fails on
//! malformed input. A rejected credential is a regular outcome carried
//! by [`ValidationResult::Invalid`].

use regex::Regex;

use crate::config::PolicyConfig;
use crate::errors::{AppError, AppResult};

/// Outcome of a policy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Configured credential policy.
#[derive(Debug, Clone)]
pub struct CredentialPolicy {
    config: PolicyConfig,
    username_pattern: Regex,
}

impl CredentialPolicy {
    /// Build a policy from configuration.
    ///
    /// # Errors
    /// Returns an internal error if the username pattern does not compile
    /// or the length bounds are inverted.
    pub fn new(config: PolicyConfig) -> AppResult<Self> {
        let username_pattern = Regex::new(&config.username_pattern).map_err(|e| {
            AppError::internal(format!("Invalid username pattern: {}", e))
        })?;

        if config.username_min_length > config.username_max_length {
            return Err(AppError::internal("Username length bounds are inverted"));
        }
        if config.password_min_length > config.password_max_length {
            return Err(AppError::internal("Password length bounds are inverted"));
        }
        if config.password_min_char_classes > 4 {
            return Err(AppError::internal(
                "Password character classes must be between 0 and 4",
            ));
        }

        Ok(Self {
            config,
            username_pattern,
        })
    }

    /// Apply the configured case policy to a raw username.
    pub fn normalize_username(&self, username: &str) -> String {
        if self.config.username_case_insensitive {
            username.to_lowercase()
        } else {
            username.to_string()
        }
    }

    /// Check a username/password pair. Username rules are reported first.
    pub fn validate(&self, username: &str, password: &str) -> ValidationResult {
        match self
            .check_username(username)
            .and_then(|_| self.check_password(password))
        {
            Ok(()) => ValidationResult::Valid,
            Err(reason) => ValidationResult::Invalid(reason),
        }
    }

    fn check_username(&self, username: &str) -> Result<(), String> {
        let cfg = &self.config;

        if username.is_empty() {
            return Err("Username is required".to_string());
        }

        let length = username.chars().count();
        if length < cfg.username_min_length || length > cfg.username_max_length {
            return Err(format!(
                "Username must be {}-{} characters",
                cfg.username_min_length, cfg.username_max_length
            ));
        }

        if !self.username_pattern.is_match(username) {
            return Err("Username contains characters that are not allowed".to_string());
        }

        Ok(())
    }

    fn check_password(&self, password: &str) -> Result<(), String> {
        let cfg = &self.config;

        if password.is_empty() {
            return Err("Password is required".to_string());
        }

        let length = password.chars().count();
        if length < cfg.password_min_length {
            return Err(format!(
                "Password must be at least {} characters",
                cfg.password_min_length
            ));
        }
        if length > cfg.password_max_length {
            return Err(format!(
                "Password must be at most {} characters",
                cfg.password_max_length
            ));
        }

        if char_classes(password) < cfg.password_min_char_classes {
            return Err(format!(
                "Password must mix at least {} of: lowercase, uppercase, digits, symbols",
                cfg.password_min_char_classes
            ));
        }

        Ok(())
    }
}

/// Count the distinct character classes present in a password.
fn char_classes(password: &str) -> u8 {
    let (mut lower, mut upper, mut digit, mut symbol) = (false, false, false, false);
    for c in password.chars() {
        if c.is_lowercase() {
            lower = true;
        } else if c.is_uppercase() {
            upper = true;
        } else if c.is_numeric() {
            digit = true;
        } else {
            symbol = true;
        }
    }
    [lower, upper, digit, symbol].iter().filter(|&&b| b).count() as u8
}
