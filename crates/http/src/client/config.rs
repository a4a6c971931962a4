//! Client configuration

use serde::{Deserialize, Serialize};

/// Environment variable selecting the API base URL
pub const BASE_URL_ENV: &str = "ASSIST_API_BASE_URL";

/// Base URL used when nothing else is configured (local development server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Route handed to the session-expired handler
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

const DEFAULT_USER_AGENT: &str = concat!("assist-client/", env!("CARGO_PKG_VERSION"));

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Entry route the host navigates to when the session is lost
    pub login_route: String,
    /// Request timeout in seconds; `None` keeps the transport default
    pub timeout_secs: Option<u64>,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults with the base URL taken from `ASSIST_API_BASE_URL` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            config.base_url = url;
        }
        config
    }
}
