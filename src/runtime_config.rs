// =============================================================================
// Runtime Configuration: service settings loaded at startup
// =============================================================================
//
// Read once from a JSON file; every field carries `#[serde(default)]` so a
// partial (or missing) file still yields a usable configuration. A handful
// of environment variables override the file for container deployments.
//
// Nothing here is user data: the dashboard itself keeps no state.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::request::DEFAULT_TICKER;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8501".to_string()
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_ticker() -> String {
    DEFAULT_TICKER.to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the Yahoo Finance chart API.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Whole-request timeout for provider calls. A timeout surfaces as
    /// `ProviderUnavailable`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent sent to the provider.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Ticker pre-filled in the sidebar.
    #[serde(default = "default_ticker")]
    pub default_ticker: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            provider_base_url: default_provider_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            default_ticker: default_ticker(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            provider = %config.provider_base_url,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply `DASHBOARD_BIND_ADDR` / `DASHBOARD_PROVIDER_URL` overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("DASHBOARD_BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(url) = lookup("DASHBOARD_PROVIDER_URL").filter(|s| !s.trim().is_empty()) {
            self.provider_base_url = url.trim().to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8501");
        assert_eq!(cfg.provider_base_url, "https://query1.finance.yahoo.com");
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.default_ticker, "AAPL");
        assert!(!cfg.user_agent.is_empty());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "bind_addr": "127.0.0.1:9000", "request_timeout_secs": 3 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.default_ticker, "AAPL");
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cfg = RuntimeConfig {
            request_timeout_secs: 0,
            ..RuntimeConfig::default()
        };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|key| match key {
            "DASHBOARD_BIND_ADDR" => Some(" 127.0.0.1:1234 ".to_string()),
            "DASHBOARD_PROVIDER_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.bind_addr, "127.0.0.1:1234");
        // Blank values are ignored.
        assert_eq!(cfg.provider_base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(RuntimeConfig::load("/nonexistent/dashboard_config.json").is_err());
    }
}
