// Runtime configuration.
// Reads the token, default user, API root, and request timeout from the environment.

use std::time::Duration;

use crate::github::GITHUB_API_BASE;

/// Request timeout used when `GITHUB_TIMEOUT_SECS` is unset or invalid.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bearer token. Empty means anonymous access.
    pub token: String,
    /// User assumed by the per-user aggregates when none is passed.
    pub default_username: Option<String>,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            default_username: None,
            api_base_url: GITHUB_API_BASE.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Load from `GITHUB_TOKEN`, `GITHUB_USERNAME`, `GITHUB_API_URL`, and `GITHUB_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = match non_empty("GITHUB_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "Ignoring invalid GITHUB_TIMEOUT_SECS");
                    DEFAULT_TIMEOUT
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Self {
            token: non_empty("GITHUB_TOKEN").unwrap_or_default(),
            default_username: non_empty("GITHUB_USERNAME"),
            api_base_url: non_empty("GITHUB_API_URL")
                .unwrap_or_else(|| GITHUB_API_BASE.to_string()),
            request_timeout,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]);
        assert_eq!(config, Config::default());
        assert!(!config.is_authenticated());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = load(&[
            ("GITHUB_TOKEN", "ghp_abc"),
            ("GITHUB_USERNAME", " octo "),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3"),
            ("GITHUB_TIMEOUT_SECS", "5"),
        ]);
        assert!(config.is_authenticated());
        assert_eq!(config.default_username.as_deref(), Some("octo"));
        assert_eq!(config.api_base_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = load(&[("GITHUB_USERNAME", "   "), ("GITHUB_TIMEOUT_SECS", "0")]);
        assert_eq!(config.default_username, None);
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
    }
}
