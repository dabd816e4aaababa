//! Configuration module
//!
//! Handles loading and saving gossipwire configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::protocol::{DecodeOptions, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_SKIP_DEPTH};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Decoder limits
    #[serde(default)]
    pub codec: CodecConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Decoder limits applied to untrusted input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Deepest nesting of legacy groups the decoder will skip
    #[serde(default = "default_max_skip_depth")]
    pub max_skip_depth: usize,
    /// Largest message accepted, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

fn default_max_skip_depth() -> usize {
    DEFAULT_MAX_SKIP_DEPTH
}

fn default_max_message_size() -> usize {
    DEFAULT_MAX_MESSAGE_SIZE
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_skip_depth: default_max_skip_depth(),
            max_message_size: default_max_message_size(),
        }
    }
}

impl CodecConfig {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_skip_depth: self.max_skip_depth,
            max_message_size: self.max_message_size,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("gossipwire/config.toml")),
            Some(PathBuf::from("./gossipwire.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.codec.max_message_size == 0 {
            return Err(ConfigError::Invalid(
                "codec.max_message_size",
                "must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    let config = Config {
        codec: CodecConfig {
            max_skip_depth: 16,
            max_message_size: 4 * 1024 * 1024,
        },
        ..Default::default()
    };

    Ok(toml::to_string_pretty(&config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.codec.decode_options(), DecodeOptions::default());
        assert!(config.output.pretty);
    }

    #[test]
    fn test_save_and_load() {
        let mut config = Config::default();
        config.codec.max_skip_depth = 3;
        let file = NamedTempFile::new().unwrap();

        config.save(file.path()).unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[codec]\nmax_skip_depth = 8").unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.codec.max_skip_depth, 8);
        assert_eq!(loaded.codec.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert!(loaded.output.pretty);
    }

    #[test]
    fn test_zero_message_size_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[codec]\nmax_message_size = 0").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid("codec.max_message_size", _))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/gossipwire.toml");
        assert!(matches!(Config::load(path), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_sample_config() {
        let sample = generate_sample_config().unwrap();
        let parsed: Config = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.codec.max_skip_depth, 16);
    }
}
