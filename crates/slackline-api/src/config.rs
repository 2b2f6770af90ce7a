// Connection settings for the Slack Web API client

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Configuration for a [`crate::SlackClient`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub token: String,
    /// Base URL of the Web API (optional, defaults to https://slack.com/api)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request deadline. No deadline when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: None,
            timeout_secs: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(SLACK_API_BASE)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = ClientConfig::new("xoxb-test");
        assert_eq!(config.base_url(), "https://slack.com/api");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = ClientConfig::new("xoxb-test").with_base_url("http://127.0.0.1:9000/api/");
        assert_eq!(config.base_url(), "http://127.0.0.1:9000/api");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ClientConfig::new("xoxp-test").with_timeout(Duration::from_secs(30));

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ClientConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.token, "xoxp-test");
        assert_eq!(deserialized.timeout(), Some(Duration::from_secs(30)));
    }
}
