//! Configuration for the display surface layer.
//!
//! Loaded from TOML. Every field has a default, so an empty or missing file
//! yields [`SurfaceConfig::default`].
//!
//! ```toml
//! display_id = 0
//! layer = 0
//! update_priority = 0
//! vsync = true
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Display opened on the compositor (0 is the main LCD/HDMI output).
    pub display_id: u32,
    /// Compositor layer number of the full-screen element.
    pub layer: i32,
    /// Priority passed when starting compositor updates.
    pub update_priority: i32,
    /// Vertical sync applied each time a rendering surface is created.
    pub vsync: bool,
    pub logging: LoggingConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            display_id: 0,
            layer: 0,
            update_priority: 0,
            vsync: true,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `"text"` or `"json"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl SurfaceConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SurfaceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration at {:?}, using defaults.", path);
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        let format = self.logging.format.to_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log format '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}
