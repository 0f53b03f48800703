// Redis store configuration
// Provides connection settings with defaults and environment overrides

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const URL_ENV: &str = "KVLOCK_REDIS_URL";
pub const TIMEOUT_ENV: &str = "KVLOCK_REDIS_TIMEOUT_MS";

/// Connection settings for `RedisStore`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedisStoreConfig {
    /// Connection URL (default: redis://127.0.0.1:6379)
    pub url: String,

    /// Upper bound for connecting and for each command (default: 3000ms)
    /// A request exceeding it is reported as a timeout
    pub response_timeout_ms: u64,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            response_timeout_ms: 3000,
        }
    }
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Defaults overridden by `KVLOCK_REDIS_URL` and `KVLOCK_REDIS_TIMEOUT_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(URL_ENV) {
            config.url = url;
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.response_timeout_ms = ms,
                _ => warn!(
                    value = %raw,
                    default_ms = config.response_timeout_ms,
                    "Ignoring invalid {}", TIMEOUT_ENV
                ),
            }
        }

        config
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RedisStoreConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.response_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_env_overrides() {
        let config = RedisStoreConfig::from_lookup(lookup(&[
            (URL_ENV, "redis://cache:6380/2"),
            (TIMEOUT_ENV, "250"),
        ]));
        assert_eq!(config.url, "redis://cache:6380/2");
        assert_eq!(config.response_timeout_ms, 250);
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        for raw in ["abc", "0", "-5"] {
            let config = RedisStoreConfig::from_lookup(lookup(&[(TIMEOUT_ENV, raw)]));
            assert_eq!(config.response_timeout_ms, 3000);
        }
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RedisStoreConfig =
            serde_json::from_str(r#"{"url":"redis://10.0.0.5:6379"}"#).unwrap();
        assert_eq!(config, RedisStoreConfig::new("redis://10.0.0.5:6379"));
    }
}
