//! Error types for the notification service.

use thiserror::Error;

/// Defines the possible errors that can occur while delivering a
/// notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// An error indicating that the delivery failed (non-2xx response).
    #[error("Notification failed: {0}")]
    NotifyFailed(String),

    /// An error from the underlying `reqwest` library.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
}
