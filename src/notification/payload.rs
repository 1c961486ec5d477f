//! Per-variant request construction for notification channels.
//!
//! Each channel variant owns its payload shape: the generic webhook nests the
//! message under a configurable JSON field, while ntfy takes a raw text body
//! with option headers.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{NtfyChannel, WebhookChannel};

/// The wire shape of a single delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelPayload {
    /// A JSON body.
    Json(Value),
    /// A raw text body with additional request headers.
    Text {
        /// The message body.
        body: String,
        /// Variant-specific headers.
        headers: HashMap<String, String>,
    },
}

/// Builds the JSON payload for a generic webhook: the message nested under
/// the configured field name.
pub fn build_webhook_payload(channel: &WebhookChannel, message: &str) -> ChannelPayload {
    let mut body = serde_json::Map::new();
    body.insert(channel.content_field_name.clone(), Value::String(message.to_string()));
    ChannelPayload::Json(Value::Object(body))
}

/// Builds the text payload and headers for an ntfy-style push notification.
pub fn build_ntfy_payload(channel: &NtfyChannel, message: &str) -> ChannelPayload {
    let mut headers = HashMap::new();
    if let Some(click_action) = &channel.click_action {
        headers.insert("X-Click".to_string(), click_action.clone());
    }
    if let Some(priority) = channel.priority {
        headers.insert("X-Priority".to_string(), priority.to_string());
    }
    if let Some(tags) = &channel.tags {
        headers.insert("X-Tags".to_string(), tags.clone());
    }
    ChannelPayload::Text { body: message.to_string(), headers }
}
