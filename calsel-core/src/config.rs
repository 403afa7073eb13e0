//! Global calsel configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CalselError, CalselResult};
use config::{Config, File};

static DEFAULT_DATA_DIR: &str = "~/.local/share/calsel";
const DEFAULT_PORT: u16 = 4650;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn is_default_port(p: &u16) -> bool {
    *p == DEFAULT_PORT
}

/// Global configuration at ~/.config/calsel/config.toml
#[derive(Serialize, Deserialize, Clone)]
pub struct CalselConfig {
    /// Where the persistence service keeps the preset document.
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// Local port the persistence service listens on.
    #[serde(default = "default_port", skip_serializing_if = "is_default_port")]
    pub port: u16,

    /// Default host bridge, e.g. "gcal" for a `calsel-host-gcal` binary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default)]
    pub watch: WatchConfig,
}

/// Intervals for the periodic session health checks, in milliseconds.
/// The host application's internal events are not observable, so every
/// check is a poll.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    #[serde(default = "WatchConfig::default_readiness_poll_ms")]
    pub readiness_poll_ms: u64,
    #[serde(default = "WatchConfig::default_group_loss_ms")]
    pub group_loss_ms: u64,
    #[serde(default = "WatchConfig::default_navigation_ms")]
    pub navigation_ms: u64,
    #[serde(default = "WatchConfig::default_navigation_settle_ms")]
    pub navigation_settle_ms: u64,
    #[serde(default = "WatchConfig::default_liveness_ms")]
    pub liveness_ms: u64,
    #[serde(default = "WatchConfig::default_recovery_delay_ms")]
    pub recovery_delay_ms: u64,
}

impl WatchConfig {
    fn default_readiness_poll_ms() -> u64 {
        200
    }

    fn default_group_loss_ms() -> u64 {
        3000
    }

    fn default_navigation_ms() -> u64 {
        1000
    }

    fn default_navigation_settle_ms() -> u64 {
        1000
    }

    fn default_liveness_ms() -> u64 {
        3000
    }

    fn default_recovery_delay_ms() -> u64 {
        1000
    }

    pub fn readiness_poll(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms)
    }

    pub fn group_loss(&self) -> Duration {
        Duration::from_millis(self.group_loss_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    pub fn liveness(&self) -> Duration {
        Duration::from_millis(self.liveness_ms)
    }

    pub fn recovery_delay(&self) -> Duration {
        Duration::from_millis(self.recovery_delay_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            readiness_poll_ms: Self::default_readiness_poll_ms(),
            group_loss_ms: Self::default_group_loss_ms(),
            navigation_ms: Self::default_navigation_ms(),
            navigation_settle_ms: Self::default_navigation_settle_ms(),
            liveness_ms: Self::default_liveness_ms(),
            recovery_delay_ms: Self::default_recovery_delay_ms(),
        }
    }
}

impl CalselConfig {
    pub fn load() -> CalselResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        let config: CalselConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .build()
            .map_err(|e| CalselError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalselError::Config(e.to_string()))?;

        Ok(config)
    }

    pub fn config_path() -> CalselResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalselError::Config("Could not determine config directory".into()))?
            .join("calsel");

        Ok(config_dir.join("config.toml"))
    }

    /// The service data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &std::path::Path) -> CalselResult<()> {
        let contents = format!(
            "\
# calsel configuration

# Where the persistence service keeps the preset document:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Local port the persistence service listens on:
# port = {DEFAULT_PORT}

# Default host bridge (resolves to a calsel-host-<name> binary on PATH):
# host = \"gcal\"

# Session health-check intervals, in milliseconds:
# [watch]
# readiness_poll_ms = 200
# group_loss_ms = 3000
# navigation_ms = 1000
# navigation_settle_ms = 1000
# liveness_ms = 3000
# recovery_delay_ms = 1000
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalselError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalselError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
