//! Notification channel declarations.
//!
//! Channels are configuration values, not persisted records: they are
//! reconstructed from the watcher configuration file on every startup and
//! live only inside the in-memory registry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event::EventCategory;

/// Provides the default JSON field name for webhook message bodies.
fn default_content_field() -> String {
    "content".to_string()
}

/// Provides the default event subscription for a channel.
fn default_on_events() -> Vec<EventCategory> {
    vec![EventCategory::Change]
}

/// Errors produced when validating a channel declaration.
#[derive(Debug, Error)]
pub enum ChannelConfigError {
    /// The ntfy priority is outside the supported 1-5 range.
    #[error("Invalid ntfy priority {0}: must be between 1 and 5")]
    InvalidPriority(u8),

    /// The delivery endpoint is not a valid URL.
    #[error("Invalid channel URL '{url}': {source}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
        /// The underlying parse error.
        source: url::ParseError,
    },
}

/// Configuration for a generic webhook channel.
///
/// The message is nested under a configurable JSON field, so the same channel
/// type serves Discord-style webhooks (`content`) and custom receivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookChannel {
    /// The delivery endpoint.
    pub url: String,
    /// The JSON field the message body is nested under.
    #[serde(default = "default_content_field")]
    pub content_field_name: String,
    /// The event categories this channel fires on.
    #[serde(default = "default_on_events")]
    pub on_events: Vec<EventCategory>,
}

/// Configuration for an ntfy-style push notification channel.
///
/// The message is delivered as a raw text body; the variant-specific options
/// map onto ntfy request headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtfyChannel {
    /// The topic endpoint, e.g. `https://ntfy.sh/my-topic`.
    pub url: String,
    /// Optional URL opened when the notification is tapped.
    #[serde(default)]
    pub click_action: Option<String>,
    /// Optional message priority, 1 (min) through 5 (max).
    #[serde(default)]
    pub priority: Option<u8>,
    /// Optional comma-separated emoji tags.
    #[serde(default)]
    pub tags: Option<String>,
    /// The event categories this channel fires on.
    #[serde(default = "default_on_events")]
    pub on_events: Vec<EventCategory>,
}

/// A configured notification sink with a category subscription filter.
///
/// New channel types extend this enum without touching the scheduler; the
/// dispatch logic only consults [`ChannelConfig::subscribes_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelConfig {
    /// A generic JSON webhook.
    Webhook(WebhookChannel),
    /// An ntfy-style push notification service.
    Ntfy(NtfyChannel),
}

impl ChannelConfig {
    /// The event categories this channel is subscribed to, as declared.
    pub fn on_events(&self) -> &[EventCategory] {
        match self {
            Self::Webhook(c) => &c.on_events,
            Self::Ntfy(c) => &c.on_events,
        }
    }

    /// The delivery endpoint of this channel.
    pub fn url(&self) -> &str {
        match self {
            Self::Webhook(c) => &c.url,
            Self::Ntfy(c) => &c.url,
        }
    }

    /// Whether an emitted category should be delivered through this channel.
    ///
    /// A subscription to `change` implicitly covers the `numeric_up` and
    /// `numeric_down` refinements.
    pub fn subscribes_to(&self, category: EventCategory) -> bool {
        self.on_events()
            .iter()
            .any(|e| *e == category || (*e == EventCategory::Change && category.is_change()))
    }

    /// Validates the channel declaration beyond what serde enforces.
    pub fn validate(&self) -> Result<(), ChannelConfigError> {
        url::Url::parse(self.url()).map_err(|source| ChannelConfigError::InvalidUrl {
            url: self.url().to_string(),
            source,
        })?;
        if let Self::Ntfy(c) = self {
            if let Some(priority) = c.priority {
                if !(1..=5).contains(&priority) {
                    return Err(ChannelConfigError::InvalidPriority(priority));
                }
            }
        }
        Ok(())
    }
}
