//! # Bot Configuration Module
//!
//! Runtime settings read from the process environment (a `.env` file is
//! honoured through `dotenv` in `main`).

use crate::errors::BotError;

// Constants for VK API access
pub const DEFAULT_API_URL: &str = "https://api.vk.com";
pub const DEFAULT_API_VERSION: &str = "5.199";
pub const DEFAULT_LONG_POLL_WAIT_SECS: u64 = 25;
/// VK rejects long poll waits above 90 seconds
pub const MAX_LONG_POLL_WAIT_SECS: u64 = 90;

pub const TOKEN_VAR: &str = "VK_TOKEN";
pub const API_URL_VAR: &str = "VK_API_URL";
pub const API_VERSION_VAR: &str = "VK_API_VERSION";
pub const LONG_POLL_WAIT_VAR: &str = "VK_LONG_POLL_WAIT";

/// Configuration structure for the bot process
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// Community access token sent with every API call
    pub token: String,
    /// Base URL of the VK API, without the `/method` suffix
    pub api_url: String,
    /// API version passed as `v`
    pub api_version: String,
    /// Seconds the long poll server may hold a request open
    pub long_poll_wait_secs: u64,
}

impl BotConfig {
    /// Create a configuration with default endpoints for the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            long_poll_wait_secs: DEFAULT_LONG_POLL_WAIT_SECS,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BotError::Config(format!("{TOKEN_VAR} must be set")))?;

        let mut config = Self::new(token);

        if let Some(url) = lookup(API_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(version) = lookup(API_VERSION_VAR).filter(|v| !v.trim().is_empty()) {
            config.api_version = version.trim().to_string();
        }

        if let Some(wait) = lookup(LONG_POLL_WAIT_VAR) {
            let secs: u64 = wait.trim().parse().map_err(|_| {
                BotError::Config(format!("{LONG_POLL_WAIT_VAR} must be a number, got '{wait}'"))
            })?;
            if secs == 0 || secs > MAX_LONG_POLL_WAIT_SECS {
                return Err(BotError::Config(format!(
                    "{LONG_POLL_WAIT_VAR} must be between 1 and {MAX_LONG_POLL_WAIT_SECS}"
                )));
            }
            config.long_poll_wait_secs = secs;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_token_is_required() {
        let result = BotConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(BotError::Config(_))));

        let result = BotConfig::from_lookup(lookup_from(&[(TOKEN_VAR, "   ")]));
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[(TOKEN_VAR, "secret")])).unwrap();
        assert_eq!(config, BotConfig::new("secret"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.long_poll_wait_secs, DEFAULT_LONG_POLL_WAIT_SECS);
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            (TOKEN_VAR, "secret"),
            (API_URL_VAR, "http://127.0.0.1:8080/"),
            (API_VERSION_VAR, "5.131"),
            (LONG_POLL_WAIT_VAR, "10"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.api_version, "5.131");
        assert_eq!(config.long_poll_wait_secs, 10);
    }

    #[test]
    fn test_invalid_wait() {
        for wait in ["soon", "0", "91"] {
            let vars = [(TOKEN_VAR, "secret"), (LONG_POLL_WAIT_VAR, wait)];
            let result = BotConfig::from_lookup(lookup_from(&vars));
            assert!(matches!(result, Err(BotError::Config(_))), "accepted {wait}");
        }
    }
}
