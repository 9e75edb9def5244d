//! Configuration system
//!
//! Viewer settings are plain serde structs persisted as TOML or RON, picked by
//! file extension.

pub mod viewer;

pub use serde::{Deserialize, Serialize};
use std::path::Path;

pub use viewer::{
    DebugMessengerConfig, LightConfig, MaterialConfig, RendererConfig, SceneConfig, Severity,
    SkyboxConfig, ViewerConfig, WindowConfig,
};

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("ron") => Ok(Format::Ron),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the extension is neither
    /// `.toml` nor `.ron`, or the contents fail to parse.
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error on unsupported extensions, serialization failure or
    /// a failed write.
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match format_of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed fine but is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");

        let err = ViewerConfig::default().save_to_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::load_from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "ViewerConfig(window: ").unwrap();

        let err = ViewerConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
