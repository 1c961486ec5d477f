//! # Notification Service
//!
//! Dispatches scrape-event messages through the channels attached to a
//! watcher. Each channel carries its own event subscription filter; dispatch
//! consults the filter (with the `change` sub-event expansion) and builds the
//! variant-specific payload.
//!
//! Delivery is fire-and-forget: a failed delivery is logged at warn level and
//! never escalates to the scheduler or blocks the scrape cycle.

pub mod error;
pub mod payload;

use error::NotificationError;
use payload::{ChannelPayload, build_ntfy_payload, build_webhook_payload};

use crate::models::{ChannelConfig, EventCategory};

/// A service that delivers messages to notification channels over HTTP.
pub struct NotificationService {
    /// The shared HTTP client for all deliveries.
    client: reqwest::Client,
}

impl NotificationService {
    /// Creates a new notification service with its own HTTP client.
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// Delivers a message to every channel subscribed to the emitted
    /// category. Failures are logged per channel and swallowed.
    pub async fn dispatch(
        &self,
        channels: &[ChannelConfig],
        category: EventCategory,
        message: &str,
    ) {
        for channel in channels {
            if !channel.subscribes_to(category) {
                continue;
            }
            if let Err(e) = self.deliver(channel, message).await {
                tracing::warn!(
                    url = %channel.url(),
                    category = %category,
                    error = %e,
                    "Notification delivery failed."
                );
            } else {
                tracing::debug!(url = %channel.url(), category = %category, "Notification delivered.");
            }
        }
    }

    /// Sends a single delivery to one channel.
    async fn deliver(
        &self,
        channel: &ChannelConfig,
        message: &str,
    ) -> Result<(), NotificationError> {
        let payload = match channel {
            ChannelConfig::Webhook(c) => build_webhook_payload(c, message),
            ChannelConfig::Ntfy(c) => build_ntfy_payload(c, message),
        };

        let request = match payload {
            ChannelPayload::Json(body) => self.client.post(channel.url()).json(&body),
            ChannelPayload::Text { body, headers } => {
                let mut request = self.client.post(channel.url()).body(body);
                for (name, value) in headers {
                    request = request.header(name, value);
                }
                request
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::NotifyFailed(format!(
                "request to {} returned status {status}",
                channel.url()
            )));
        }
        Ok(())
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}
