use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com/";

/// The listing and comment endpoints reject default library agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Transport configuration for the Reddit client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Root of every endpoint (default: https://www.reddit.com/)
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Value of the Accept-Language header
    pub accept_language: String,

    /// Idle timeout for a single request in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Total transfer timeout in seconds (default: 300)
    pub resource_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            request_timeout_secs: 30,
            resource_timeout_secs: 300,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_secs(self.resource_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = HttpConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.resource_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_default_user_agent_looks_like_a_browser() {
        let config = HttpConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
