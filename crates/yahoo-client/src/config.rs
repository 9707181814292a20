use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YahooConfig {
    /// Root of the quote API (quoteSummary and crumb endpoints live under it).
    pub base_url: String,
    /// Page hit once to obtain the session cookie that the crumb is bound to.
    pub cookie_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Perform the cookie + crumb handshake before the first quoteSummary call.
    pub use_crumb: bool,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            use_crumb: true,
        }
    }
}

impl YahooConfig {
    /// Load from `YAHOO_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let defaults = Self::default();
        Ok(Self {
            base_url: env::var("YAHOO_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            cookie_url: env::var("YAHOO_COOKIE_URL").unwrap_or(defaults.cookie_url),
            timeout_secs: parse_var("YAHOO_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
            user_agent: env::var("YAHOO_USER_AGENT").unwrap_or(defaults.user_agent),
            use_crumb: parse_var("YAHOO_USE_CRUMB")?.unwrap_or(defaults.use_crumb),
        })
    }

    /// Config pointing at an arbitrary endpoint with no crumb handshake.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            use_crumb: false,
            ..Self::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, AnalysisError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AnalysisError::Config(format!("{key} has an invalid value: {raw:?}"))),
        Err(_) => Ok(None),
    }
}
