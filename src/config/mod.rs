//! Client configuration and credential storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::models::{Color, Format, MessageFormat, RoomRef};

pub const DEFAULT_API_URL: &str = "https://api.hipchat.com/v1";
pub const DEFAULT_FROM: &str = "API";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "HIPCHAT_TOKEN";

/// Defaults applied to every request a client makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API base URL, without a trailing slash
    pub api_url: String,
    /// API authentication token (managed in the HipChat admin panel)
    pub token: Option<String>,
    /// Default room, by id or name
    pub room: Option<RoomRef>,
    /// Default sender display name
    pub from: String,
    /// Whether messages ping the room by default
    pub notify: bool,
    pub color: Color,
    pub message_format: MessageFormat,
    /// Response format requested from the API
    pub format: Format,
    /// Shorten over-long sender names and messages instead of rejecting them
    pub auto_truncate: bool,
    /// Timezone history timestamps are rendered in
    pub timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            room: None,
            from: DEFAULT_FROM.to_string(),
            notify: false,
            color: Color::default(),
            message_format: MessageFormat::default(),
            format: Format::default(),
            auto_truncate: false,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "hipchat-cli", "hipchat-cli")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.apply_token_override(&token);
        }
        Ok(config)
    }

    /// Load configuration from disk only
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // Set restrictive permissions on config file (contains the token)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    fn apply_token_override(&mut self, token: &str) {
        let token = token.trim();
        if !token.is_empty() {
            tracing::debug!("Using token from {}", TOKEN_ENV);
            self.token = Some(token.to_string());
        }
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
