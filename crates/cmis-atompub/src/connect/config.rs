//! AtomPub client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use cmis_core::types::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the AtomPub HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AtomPubConfig {
    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "CMIS_HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "CMIS_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Number of items requested per page of a listing
    #[cfg_attr(
        feature = "config",
        arg(long = "page-size", env = "CMIS_PAGE_SIZE", default_value = "100")
    )]
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for AtomPubConfig {
    fn default() -> Self {
        Self {
            http_timeout: default_timeout_secs(),
            user_agent: None,
            page_size: default_page_size(),
        }
    }
}

impl AtomPubConfig {
    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    /// Returns the effective page size, using default if zero.
    pub fn effective_page_size(&self) -> u32 {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    fn default_user_agent() -> String {
        format!("cmis-atompub/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AtomPubConfig::default();
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert_eq!(config.effective_page_size(), 100);
        assert!(config.effective_user_agent().starts_with("cmis-atompub/"));
    }

    #[test]
    fn zero_values_fall_back() {
        let config = AtomPubConfig::default().with_timeout(0).with_page_size(0);
        assert_eq!(config.effective_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.effective_page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: AtomPubConfig = serde_json::from_str(r#"{"page_size": 25}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.http_timeout, DEFAULT_TIMEOUT_SECS);
    }
}
