//! Conversion-complete notification
//!
//! Delivery is best-effort and at-most-once: no retries, no queue. Failures are logged
//! and dropped.

mod dispatcher;
mod http;

pub use dispatcher::NotificationDispatcher;
pub use http::HttpNotifier;

use std::time::Duration;

use async_trait::async_trait;
use jpg2avif_core::models::NotificationPayload;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Notification endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Delivers a notification payload to the downstream API.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotificationError>;
}
