//! PlanChat configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main PlanChat configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity of the deployed agent
    pub agent: AgentConfig,

    /// Relay (server side) settings
    pub relay: RelayConfig,

    /// Chat client settings
    pub client: ClientConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .planchat.yml
        let local_config = PathBuf::from(".planchat.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/planchat/planchat.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("planchat").join("planchat.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load later reports them properly.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Identity of the agent we talk to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Application name the agent is deployed under
    #[serde(rename = "app-name")]
    pub app_name: String,

    /// Event author whose content counts as a reply
    #[serde(rename = "assistant-author")]
    pub assistant_author: String,

    /// Pseudo user id sent with every request
    #[serde(rename = "user-id")]
    pub user_id: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            app_name: "planning_agent".to_string(),
            assistant_author: "planning_agent".to_string(),
            user_id: "u_123".to_string(),
        }
    }
}

/// Relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Environment variable holding the agent API base URL
    #[serde(rename = "base-url-env")]
    pub base_url_env: String,

    /// Explicit base URL, takes precedence over the environment
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Address `pc serve` listens on
    pub bind: String,

    /// Upstream request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url_env: "EXTERNAL_API_BASE_URL".to_string(),
            base_url: None,
            bind: "127.0.0.1:3000".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl RelayConfig {
    /// Resolve the agent API base URL
    ///
    /// Returns None when neither the config nor the environment provides a
    /// non-empty value. Trailing slashes are stripped.
    pub fn resolve_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| std::env::var(&self.base_url_env).ok())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Chat client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay endpoint root; when unset the relay runs in-process
    #[serde(rename = "relay-url")]
    pub relay_url: Option<String>,

    /// File holding the persisted session id
    #[serde(rename = "session-file")]
    pub session_file: PathBuf,

    /// Days before a stored session id expires
    #[serde(rename = "session-ttl-days")]
    pub session_ttl_days: i64,

    /// Relay request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/planchat on Linux)
        let session_file = dirs::data_local_dir()
            .map(|d| d.join("planchat"))
            .unwrap_or_else(|| PathBuf::from(".planchat"))
            .join("session.json");

        Self {
            relay_url: None,
            session_file,
            session_ttl_days: 7,
            timeout_ms: 180_000,
        }
    }
}

impl ClientConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
