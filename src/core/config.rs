//! Client configuration and its persistence
//!
//! [`ClientConfig`] is stored as `config.json` in the platform config
//! directory, e.g. `~/.config/pocketchess/config.json` on Linux.
//!
//! # Error Handling
//!
//! - A missing or unreadable file falls back to defaults, with a log line
//! - Fields absent from the file take their default value
//!
//! # Secrets
//!
//! The datastore identity is never written to disk. It is read from
//! `CHESS_USER_ID` and `CHESS_DB_TOKEN`, which may come from a `.env` file.

use directories::ProjectDirs;
use engine_service::{Credentials, ServiceSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::core::error::{CoreError, CoreResult};
use crate::game::mode::{DEFAULT_QUIZ_HINTS, DEFAULT_QUIZ_ROUNDS};

/// Config filename
const CONFIG_FILENAME: &str = "config.json";

pub const USER_ID_VAR: &str = "CHESS_USER_ID";
pub const DB_TOKEN_VAR: &str = "CHESS_DB_TOKEN";

const DEFAULT_SERVER_URL: &str = "https://lralli.pythonanywhere.com";
const DEFAULT_DATABASE_URL: &str =
    "https://chessmacc-3aaab-default-rtdb.europe-west1.firebasedatabase.app";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Engine/quiz service base URL
    pub server_url: String,
    /// Realtime-database base URL for scores and history
    pub database_url: String,
    pub request_timeout_secs: u64,
    pub quiz_rounds: u32,
    pub quiz_hints: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            request_timeout_secs: 10,
            quiz_rounds: DEFAULT_QUIZ_ROUNDS,
            quiz_hints: DEFAULT_QUIZ_HINTS,
        }
    }
}

/// Path of `config.json` in the user's configuration directory
pub fn config_path() -> CoreResult<PathBuf> {
    ProjectDirs::from("com", "pocketchess", "PocketChess")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
        .ok_or(CoreError::NoConfigDir)
}

impl ClientConfig {
    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        let path = match config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("[CONFIG] {}. Using defaults.", e);
                return Self::default();
            }
        };
        if !path.exists() {
            info!("[CONFIG] No config file at {:?}. Using defaults.", path);
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                info!("[CONFIG] Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!(
                    "[CONFIG] Failed to load config at {:?}: {}. Using defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write to the default location; returns the path written
    pub fn save(&self) -> CoreResult<PathBuf> {
        let path = config_path()?;
        self.save_to(&path)?;
        info!("[CONFIG] Saved config to {:?}", path);
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connection settings for the engine service
    pub fn service_settings(&self, credentials: Option<Credentials>) -> ServiceSettings {
        ServiceSettings {
            server_url: self.server_url.clone(),
            database_url: self.database_url.clone(),
            timeout: self.request_timeout(),
            credentials,
        }
    }
}

/// Datastore identity from the environment; `None` when signed out
pub fn credentials_from_env() -> Option<Credentials> {
    let user_id = std::env::var(USER_ID_VAR)
        .ok()
        .filter(|id| !id.trim().is_empty())?;
    let auth_token = std::env::var(DB_TOKEN_VAR)
        .ok()
        .filter(|token| !token.trim().is_empty());
    Some(Credentials {
        user_id,
        auth_token,
    })
}
