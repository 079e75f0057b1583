//! Configuration loading and defaults for idle-monitor.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::domain::EventKind;
use crate::domain::EventKinds;
use crate::monitor::MonitorConfig;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Timeout must be a positive number of milliseconds")]
    NonPositiveTimeout,

    #[error("At least one event kind must be monitored")]
    NoTargets,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings for the page view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewConfig {
    /// Text shown while the user is active (default: "Ehila!").
    pub active_message: String,

    /// Text shown once the user went idle (default: "Are you still here?").
    pub prompt_message: String,

    /// Selector of the element whose text is replaced (default: "h1").
    pub text_target: String,

    /// Selectors of the elements whose style class is toggled.
    pub class_targets: Vec<String>,

    /// Class applied while active (default: "active").
    pub active_class: String,

    /// Class applied while inactive (default: "inactive").
    pub inactive_class: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            active_message: "Ehila!".to_string(),
            prompt_message: "Are you still here?".to_string(),
            text_target: "h1".to_string(),
            class_targets: vec!["h1".to_string(), ".content".to_string()],
            active_class: "active".to_string(),
            inactive_class: "inactive".to_string(),
        }
    }
}

/// Main configuration for idle-monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Silence window in milliseconds before going inactive (default: 3000).
    pub timeout_ms: u64,

    /// Event kinds that count as activity (default: all qualifying kinds).
    pub events: Vec<EventKind>,

    pub view: ViewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            events: EventKind::ALL.to_vec(),
            view: ViewConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the given path or the default location, or
    /// return defaults if no file exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = path {
            return Self::load(p);
        }

        if let Some(default_path) = default_path()
            && default_path.exists()
        {
            return Self::load(&default_path);
        }

        Ok(Self::default())
    }

    /// The set of monitored event kinds.
    pub fn targets(&self) -> EventKinds {
        self.events.iter().copied().collect()
    }

    /// Validate into monitor settings.
    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        MonitorConfig::new(self.timeout_ms, self.targets())
    }
}

/// Default config file location: `<config dir>/idle-monitor/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("idle-monitor").join("config.toml"))
}
