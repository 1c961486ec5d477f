//! Core data structures shared across the application.

pub mod channel;
pub mod event;
pub mod watcher;

pub use channel::{ChannelConfig, ChannelConfigError, NtfyChannel, WebhookChannel};
pub use event::EventCategory;
pub use watcher::{Watcher, WatcherConfig};
