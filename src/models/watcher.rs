//! This module defines the `Watcher` structure, one monitored (URL, selector)
//! pair under periodic observation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::channel::ChannelConfig;

/// A persisted watcher row.
///
/// The (`url`, `css_selector`, `name`) triple is the logical identity:
/// renaming a watcher creates a logically new one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Watcher {
    /// Unique identifier, assigned by the store on first creation.
    #[sqlx(rename = "watcher_id")]
    #[serde(default)]
    pub id: i64,

    /// The page to load.
    pub url: String,

    /// CSS selector locating the element of interest.
    pub css_selector: String,

    /// Human-readable label; part of the dedup key.
    pub name: String,

    /// Minimum time between scrapes, in seconds.
    pub interval: i64,

    /// Wait time before (or between scroll steps while) extracting, in
    /// seconds. Supports pages that lazy-load.
    pub pause_time: i64,

    /// If set, the extractor scrolls until the page height stabilizes or the
    /// element appears.
    pub scroll_to_bottom: bool,

    /// If set, notification messages include the watcher's name and URL.
    pub verbose_notifications: bool,

    /// Epoch seconds of the most recent scrape; `None` means never scraped.
    pub last_scrape: Option<f64>,

    /// The most recently observed extracted text; `None` means never
    /// observed.
    pub data: Option<String>,
}

impl Watcher {
    /// Creates a new watcher row from a configuration entry (without an ID).
    pub fn from_config(config: &WatcherConfig) -> Self {
        Self {
            id: 0, // Assigned by the store on insert.
            url: config.url.clone(),
            css_selector: config.css_selector.clone(),
            name: config.resolved_name(),
            interval: config.interval,
            pause_time: config.pause_time,
            scroll_to_bottom: config.scroll_to_bottom,
            verbose_notifications: config.verbose_notifications,
            last_scrape: None,
            data: None,
        }
    }

    /// Whether enough time has elapsed for this watcher to be re-scraped.
    ///
    /// A watcher that has never been scraped is always due.
    pub fn is_due(&self, now: f64) -> bool {
        match self.last_scrape {
            None => true,
            Some(last) => last + self.interval as f64 <= now,
        }
    }
}

/// A watcher declaration from the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// The page to load.
    pub url: String,

    /// CSS selector locating the element of interest.
    pub css_selector: String,

    /// Optional display name; derived from url + selector when omitted.
    #[serde(default)]
    pub name: Option<String>,

    /// Minimum time between scrapes, in seconds.
    pub interval: i64,

    /// Wait time before extracting, in seconds.
    #[serde(default)]
    pub pause_time: i64,

    /// Scroll to the bottom until the page height stabilizes.
    #[serde(default)]
    pub scroll_to_bottom: bool,

    /// Include the watcher's name and URL in notification messages.
    #[serde(default)]
    pub verbose_notifications: bool,

    /// The notification channels attached to this watcher. Never persisted;
    /// reconstructed from configuration on every startup.
    #[serde(default)]
    pub notifiers: Vec<ChannelConfig>,
}

impl WatcherConfig {
    /// The display name, falling back to a string derived from the URL and
    /// selector.
    pub fn resolved_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} ({})", self.url, self.css_selector),
        }
    }
}
