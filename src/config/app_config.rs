use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::{BrowserConfig, helpers::deserialize_duration_from_ms};

/// Provides the default value for poll_interval_ms.
fn default_poll_interval() -> Duration {
    Duration::from_millis(1000)
}

/// Application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite database.
    pub database_url: String,

    /// Path to the watcher configuration file.
    #[serde(skip_deserializing)]
    pub watcher_config_path: PathBuf,

    /// The cadence of the scheduler loop: how long to sleep between scans of
    /// the watcher table. Distinct from each watcher's own interval.
    #[serde(deserialize_with = "deserialize_duration_from_ms", default = "default_poll_interval")]
    pub poll_interval_ms: Duration,

    /// Browser driver selection and options.
    #[serde(default)]
    pub browser: BrowserConfig,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{config_dir_str}/app.yaml")))
            .add_source(Environment::with_prefix("VIGIL").separator("__"))
            .build()?;
        let mut config: Self = s.try_deserialize()?;

        // Resolve the watcher file relative to the config directory.
        config.watcher_config_path = Path::new(config_dir_str).join("watchers.yaml");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowserEngine;

    #[test]
    fn test_app_config_from_file() {
        let config_content = r#"
        database_url: "sqlite::memory:"
        poll_interval_ms: 250
        browser:
          engine: firefox
          headless: true
        "#;
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("app.yaml"), config_content).unwrap();

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.poll_interval_ms, Duration::from_millis(250));
        assert_eq!(config.browser.engine, BrowserEngine::Firefox);
        assert!(config.browser.headless);
        assert_eq!(config.watcher_config_path, temp_dir.path().join("watchers.yaml"));
    }

    #[test]
    fn test_app_config_defaults() {
        let config_content = r#"
        database_url: "sqlite://vigil.db"
        "#;
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("app.yaml"), config_content).unwrap();

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        assert_eq!(config.poll_interval_ms, Duration::from_millis(1000));
        assert_eq!(config.browser.engine, BrowserEngine::Chrome);
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = AppConfig::new(Some(temp_dir.path().to_str().unwrap()));
        assert!(result.is_err());
    }
}
