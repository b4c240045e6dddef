use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use jpg2avif_core::models::NotificationPayload;
use jpg2avif_core::NotificationConfig;
use tokio::task::JoinHandle;

use super::{HttpNotifier, Notifier};

/// Fire-and-forget front end for a [`Notifier`].
///
/// [`dispatch`](Self::dispatch) spawns the delivery onto its own task and returns
/// immediately. The task is bounded by `timeout` and never reports back to the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            notifier: Some(notifier),
            timeout,
        }
    }

    /// A dispatcher that drops every payload.
    pub fn disabled() -> Self {
        Self {
            notifier: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        if !config.enabled {
            tracing::info!("Conversion notifications disabled");
            return Ok(Self::disabled());
        }

        let notifier = HttpNotifier::new(config)?;
        tracing::info!(endpoint = %notifier.endpoint(), "Conversion notifications enabled");
        Ok(Self::new(Arc::new(notifier), config.timeout()))
    }

    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Send `payload` in the background. Returns the delivery task, or `None` when
    /// notifications are disabled. Callers are free to drop the handle.
    pub fn dispatch(&self, payload: NotificationPayload) -> Option<JoinHandle<()>> {
        let notifier = self.notifier.clone()?;
        let timeout = self.timeout;

        Some(tokio::spawn(async move {
            match tokio::time::timeout(timeout, notifier.send(&payload)).await {
                Ok(Ok(())) => {
                    tracing::debug!(
                        original_filename = %payload.original_filename,
                        success = payload.success,
                        "Conversion notification delivered"
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        original_filename = %payload.original_filename,
                        error = %e,
                        "Failed to deliver conversion notification"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        original_filename = %payload.original_filename,
                        timeout_secs = timeout.as_secs_f64(),
                        "Conversion notification timed out"
                    );
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingNotifier {
        received: Mutex<Vec<NotificationPayload>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, payload: &NotificationPayload) -> Result<(), NotificationError> {
            self.received.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct HangingNotifier;

    #[async_trait]
    impl Notifier for HangingNotifier {
        async fn send(&self, _payload: &NotificationPayload) -> Result<(), NotificationError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _payload: &NotificationPayload) -> Result<(), NotificationError> {
            Err(NotificationError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn payload() -> NotificationPayload {
        NotificationPayload::failed("scan.jpg", 10, "Encoder exited with status 1", 3)
    }

    #[tokio::test]
    async fn test_dispatch_delivers_payload() {
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = NotificationDispatcher::new(notifier.clone(), Duration::from_secs(1));

        dispatcher.dispatch(payload()).unwrap().await.unwrap();

        let received = notifier.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].original_filename, "scan.jpg");
        assert!(!received[0].success);
    }

    #[tokio::test]
    async fn test_hanging_notifier_is_bounded_and_does_not_block_dispatch() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(HangingNotifier), Duration::from_millis(50));

        let started = Instant::now();
        let handle = dispatcher.dispatch(payload()).unwrap();
        assert!(started.elapsed() < Duration::from_millis(50));

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("delivery task should end at its own deadline")
            .unwrap();
    }

    #[tokio::test]
    async fn test_failing_notifier_is_swallowed() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(FailingNotifier), Duration::from_secs(1));
        dispatcher.dispatch(payload()).unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_dispatcher_sends_nothing() {
        let dispatcher = NotificationDispatcher::disabled();
        assert!(!dispatcher.is_enabled());
        assert!(dispatcher.dispatch(payload()).is_none());
    }

    #[tokio::test]
    async fn test_from_config_respects_enabled_flag() {
        let config = NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        };
        assert!(!NotificationDispatcher::from_config(&config)
            .unwrap()
            .is_enabled());

        let dispatcher = NotificationDispatcher::from_config(&NotificationConfig::default()).unwrap();
        assert!(dispatcher.is_enabled());
    }
}
