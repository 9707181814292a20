use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use yahoo_client::YahooConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub yahoo: YahooConfig,
    /// Emit one JSON object per line instead of human-readable logs.
    pub json_logging: bool,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            yahoo: YahooConfig::from_env().context("Invalid Yahoo Finance configuration")?,
            json_logging: json_logging_from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.yahoo.timeout_secs == 0 {
            anyhow::bail!("YAHOO_TIMEOUT_SECS must be greater than zero");
        }
        if !self.yahoo.base_url.starts_with("http://") && !self.yahoo.base_url.starts_with("https://") {
            anyhow::bail!("YAHOO_BASE_URL must be an http(s) URL, got {}", self.yahoo.base_url);
        }
        Ok(())
    }
}

fn json_logging_from_env() -> bool {
    env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yahoo: YahooConfig) -> AgentConfig {
        AgentConfig {
            yahoo,
            json_logging: false,
        }
    }

    #[test]
    fn test_default_yahoo_config_is_valid() {
        assert!(config(YahooConfig::default()).validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let yahoo = YahooConfig {
            timeout_secs: 0,
            ..YahooConfig::default()
        };
        assert!(config(yahoo).validate().is_err());
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let yahoo = YahooConfig::for_base_url("ftp://example.com");
        assert!(config(yahoo).validate().is_err());
    }

    #[test]
    fn test_json_logging_read_from_env() {
        std::env::set_var("RUST_LOG_FORMAT", "JSON");
        let config = AgentConfig::from_env().unwrap();
        std::env::remove_var("RUST_LOG_FORMAT");
        assert!(config.json_logging);
    }
}
