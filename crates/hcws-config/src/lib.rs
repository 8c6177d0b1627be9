// hcws-config: TOML + `HCWS_` env configuration for sessions and entities.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hcws_api::SessionConfig;
use hcws_core::EntityConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub entities: EntityConfig,
}

/// How the session handle talks to its connection task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Milliseconds `send_sync` may take, queueing included.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Requests buffered ahead of the connection task.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_send_timeout_ms() -> u64 {
    10_000
}
fn default_queue_capacity() -> usize {
    32
}

impl SessionSettings {
    /// Validate and convert into the session's runtime config.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        if self.send_timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "session.send_timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "session.queue_capacity".into(),
                reason: "must be greater than zero".into(),
            });
        }

        Ok(SessionConfig {
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            queue_capacity: self.queue_capacity,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "hcws", "hcws").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hcws");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HCWS_").split("__"))
}

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
