//! CLI configuration
//!
//! Layered with the `config` crate: built-in defaults (base URL from
//! `ASSIST_API_BASE_URL` when set), then `<data_dir>/config.toml`, then
//! `ASSIST__`-prefixed environment variables such as `ASSIST__API__LOGIN_ROUTE`.

use anyhow::Result;
use assist_http::client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// API client settings
    pub api: ClientConfig,

    /// Where the session is persisted; defaults to `<data_dir>/session.json`
    pub session_file: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration with defaults, config file and environment variables
    pub fn load(data_dir: &Path) -> Result<Self> {
        let defaults = ClientConfig::from_env();

        let settings = config::Config::builder()
            .set_default("api.base_url", defaults.base_url)?
            .set_default("api.login_route", defaults.login_route)?
            .set_default("api.user_agent", defaults.user_agent)?
            .add_source(config::File::from(data_dir.join(CONFIG_FILE)).required(false))
            .add_source(
                config::Environment::with_prefix("ASSIST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_path(&self, data_dir: &Path) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| data_dir.join(SESSION_FILE))
    }
}

/// `ASSIST_STATE_DIR`, else the platform data directory
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ASSIST_STATE_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("assist")
    }
}
