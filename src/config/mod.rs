//! Configuration module.

mod app_config;
mod browser;
mod helpers;
mod watcher_loader;

pub use app_config::AppConfig;
pub use browser::{BrowserConfig, BrowserEngine};
pub use helpers::{deserialize_duration_from_ms, serialize_duration_to_ms};
pub use watcher_loader::{WatcherLoader, WatcherLoaderError};
