// Persisted connection settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_PORT: &str = "8080";

const CONFIG_FILE_NAME: &str = ".headscale_gui_config.json";

/// The two fields remembered between sessions. The auth key is deliberately
/// absent: it must never touch disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub server_ip: String,
    #[serde(default = "default_port")]
    pub port: String,
}

fn default_port() -> String {
    DEFAULT_PORT.to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_ip: String::new(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the per-user config file. Load never fails from the
/// caller's point of view; save failures are reported but callers only log
/// them, so a broken home directory can't block a successful connection.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Self {
        let path = dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        Self { path }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> ConnectionConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(err) => {
                warn!("failed to load config from {}: {err}", self.path.display());
                ConnectionConfig::default()
            }
        }
    }

    fn try_load(&self) -> Result<ConnectionConfig, ConfigError> {
        if !self.path.exists() {
            return Ok(ConnectionConfig::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Full rewrite of the config file.
    pub fn save(&self, config: &ConnectionConfig) -> Result<(), ConfigError> {
        let json = serde_json::to_string(config)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
