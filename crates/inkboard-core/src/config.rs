//! Whiteboard configuration.

use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Defaults for a whiteboard session. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Initial drawing color as `#rrggbb`.
    pub default_color: String,
    pub default_width: u32,
    pub default_fill: bool,
    /// Where the text tool inserts new text.
    pub text_position: (f64, f64),
    pub text_content: String,
    /// Page color behind the background image.
    pub background_color: String,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            canvas_width: 720,
            canvas_height: 400,
            default_color: "#000000".to_string(),
            default_width: 5,
            default_fill: false,
            text_position: (100.0, 100.0),
            text_content: "text".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

impl WhiteboardConfig {
    /// `<config_dir>/inkboard/config.json`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("inkboard").join("config.json"))
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        Self::load_or_default(&path)
    }

    /// Load from `path`, falling back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Initial drawing color. Invalid values fall back to black.
    pub fn color(&self) -> SerializableColor {
        SerializableColor::from_hex(&self.default_color).unwrap_or_else(SerializableColor::black)
    }

    /// Page color. Invalid values fall back to white.
    pub fn background(&self) -> SerializableColor {
        SerializableColor::from_hex(&self.background_color)
            .unwrap_or_else(SerializableColor::white)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WhiteboardConfig::default();
        assert_eq!((config.canvas_width, config.canvas_height), (720, 400));
        assert_eq!(config.color(), SerializableColor::black());
        assert_eq!(config.default_width, 5);
        assert_eq!(config.text_content, "text");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r##"{{"default_color": "#ff0000", "canvas_width": 1024}}"##).unwrap();

        let config = WhiteboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.canvas_width, 1024);
        assert_eq!(config.canvas_height, 400);
        assert_eq!(config.color(), SerializableColor::new(255, 0, 0, 255));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            WhiteboardConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            WhiteboardConfig::load_or_default(file.path()),
            WhiteboardConfig::default()
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            WhiteboardConfig::from_file(&path),
            Err(ConfigError::Io(_))
        ));
        assert_eq!(WhiteboardConfig::load_or_default(&path), WhiteboardConfig::default());
    }
}
