//! Loading and validation of the watcher configuration file.

use std::{fs, path::PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ChannelConfigError, WatcherConfig};

/// Container for watcher configurations loaded from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfigFile {
    /// The declared watchers.
    pub watchers: Vec<WatcherConfig>,
}

/// Loads watcher declarations from a file.
pub struct WatcherLoader {
    path: PathBuf,
}

/// Errors that can occur while loading watcher configurations.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum WatcherLoaderError {
    /// Error when reading the watcher configuration file.
    #[error("Failed to load watcher configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// Error when parsing the watcher configuration file. An unrecognized
    /// event category or channel type surfaces here.
    #[error("Failed to parse watcher configuration: {0}")]
    ParseError(String),

    /// Error when the watcher configuration format is unsupported.
    #[error("Unsupported watcher configuration format")]
    UnsupportedFormat,

    /// A channel declaration failed validation.
    #[error("Invalid channel for watcher '{watcher}': {source}")]
    InvalidChannel {
        /// The resolved name of the offending watcher.
        watcher: String,
        /// The underlying validation error.
        source: ChannelConfigError,
    },
}

impl WatcherLoader {
    /// Creates a new `WatcherLoader` instance.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads and validates the watcher configuration from the specified file.
    pub fn load(&self) -> Result<Vec<WatcherConfig>, WatcherLoaderError> {
        if !self.is_yaml_file() {
            return Err(WatcherLoaderError::UnsupportedFormat);
        }

        let config_str = fs::read_to_string(&self.path)?;
        let config: WatcherConfigFile = Config::builder()
            .add_source(File::from_str(&config_str, config::FileFormat::Yaml))
            .build()
            .map_err(|e| WatcherLoaderError::ParseError(e.to_string()))?
            .try_deserialize()
            .map_err(|e| WatcherLoaderError::ParseError(e.to_string()))?;

        for watcher in &config.watchers {
            for channel in &watcher.notifiers {
                channel.validate().map_err(|source| WatcherLoaderError::InvalidChannel {
                    watcher: watcher.resolved_name(),
                    source,
                })?;
            }
        }

        Ok(config.watchers)
    }

    /// Checks if the file has a YAML extension.
    fn is_yaml_file(&self) -> bool {
        matches!(self.path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml"))
    }
}
