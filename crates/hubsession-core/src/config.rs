//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! API endpoint, OAuth application key/secret, HTTP timeouts, which
//! credential store backend to use, and the last used username.
//!
//! Configuration is stored at `~/.config/hubsession/config.json`.
//! Selected fields can be overridden through `HUBSESSION_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{
    CONNECT_TIMEOUT_SECS, DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT, REQUEST_TIMEOUT_SECS,
};
use crate::auth::SessionPolicy;
use crate::models::token::DEFAULT_TOKEN_NOTE;
use crate::models::OAuthApp;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "hubsession";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Encrypted token file name, used by the `file` store backend
const TOKEN_FILE: &str = "token.json";

pub const ENV_API_URL: &str = "HUBSESSION_API_URL";
pub const ENV_CLIENT_ID: &str = "HUBSESSION_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "HUBSESSION_CLIENT_SECRET";
pub const ENV_USERNAME: &str = "HUBSESSION_USERNAME";
pub const ENV_STORE_PASSPHRASE: &str = "HUBSESSION_STORE_PASSPHRASE";

/// Where the bearer token is persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// OS keychain
    #[default]
    Keyring,
    /// Passphrase-encrypted file in the data directory
    File,
    /// Not persisted
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub note: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub store: StoreBackend,
    pub clear_on_connection_error: bool,
    pub last_username: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            note: DEFAULT_TOKEN_NOTE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            store: StoreBackend::default(),
            clear_on_connection_error: true,
            last_username: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from the environment. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(id) = non_empty(ENV_CLIENT_ID) {
            self.client_id = id;
        }
        if let Some(secret) = non_empty(ENV_CLIENT_SECRET) {
            self.client_secret = secret;
        }
        if let Some(username) = non_empty(ENV_USERNAME) {
            self.last_username = Some(username);
        }
    }

    pub fn oauth_app(&self) -> OAuthApp {
        OAuthApp::new(&self.client_id, &self.client_secret).with_note(&self.note)
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            clear_on_connection_error: self.clear_on_connection_error,
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Path of the encrypted token file for the `file` backend
    pub fn token_file_path(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join(TOKEN_FILE))
    }
}
