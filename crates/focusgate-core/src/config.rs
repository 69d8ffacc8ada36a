//! TOML-based application configuration.
//!
//! Stores user preferences for the automation engine:
//! - Automation on/off and the start offset
//! - Calendar filter criteria
//! - Target do-not-disturb mode
//! - Notification toggles
//!
//! Configuration is stored at `~/.config/focusgate/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::EngineConfig;
use crate::error::ConfigError;

/// Returns `~/.config/focusgate[-dev]/` based on FOCUSGATE_ENV, honoring
/// FOCUSGATE_DATA_DIR as an explicit override (used by tests).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = if let Ok(dir) = std::env::var("FOCUSGATE_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("FOCUSGATE_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("focusgate-dev")
        } else {
            base_dir.join("focusgate")
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Application configuration. The `automation` section is handed to the
/// engine verbatim; `query` is used by the caller when reading the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub automation: EngineConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// How far ahead the caller asks the calendar source to look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: u32,
}

fn default_lookahead_hours() -> u32 {
    24
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            lookahead_hours: default_lookahead_hours(),
        }
    }
}

impl AppConfig {
    /// Path to the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Save the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::override_watch::DndMode;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.automation.automation_enabled);
        assert_eq!(config.automation.start_offset_minutes, 0);
        assert_eq!(config.automation.target_mode, DndMode::PriorityOnly);
        assert_eq!(config.query.lookahead_hours, 24);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = AppConfig::default();
        config.automation.start_offset_minutes = -5;
        config.automation.filter.busy_only = true;
        config.automation.filter.title_keywords = vec!["standup".into()];
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("FOCUSGATE_DATA_DIR", dir.path());
        let mut config = AppConfig::default();
        config.automation.automation_enabled = false;
        config.save().unwrap();
        assert_eq!(AppConfig::load().unwrap(), config);
        std::env::remove_var("FOCUSGATE_DATA_DIR");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[automation]\nstart_offset_minutes = 3\n").unwrap();
        assert_eq!(parsed.automation.start_offset_minutes, 3);
        assert!(parsed.automation.automation_enabled);
        assert_eq!(parsed.query.lookahead_hours, 24);
    }
}
