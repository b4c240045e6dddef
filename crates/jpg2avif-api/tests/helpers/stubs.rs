//! Stand-ins for the encoder, the notification receiver and the resource monitor.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use jpg2avif_core::models::{MemoryUsage, NotificationPayload};
use jpg2avif_infra::{NotificationError, Notifier, ResourceMonitor};
use jpg2avif_processing::{AvifEncoder, ConversionError};

pub const STUB_AVIF: &[u8] = b"\x00\x00\x00\x1cftypavif-stub-output";
pub const EMPTY_INPUT_STDERR: &str = "ERROR: Can't decode JPEG: empty input";

/// Counts invocations. Writes [`STUB_AVIF`] for non-empty input and rejects empty input
/// the way the real encoder does.
#[derive(Default)]
pub struct SpyEncoder {
    calls: AtomicUsize,
}

impl SpyEncoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AvifEncoder for SpyEncoder {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let data = tokio::fs::read(input).await.expect("input must exist");
        if data.is_empty() {
            return Err(ConversionError::EncoderFailed {
                status: Some(1),
                stderr: EMPTY_INPUT_STDERR.to_string(),
            });
        }

        tokio::fs::write(output, STUB_AVIF)
            .await
            .expect("output must be writable");
        Ok(())
    }
}

/// Records every payload it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<NotificationPayload>>,
}

impl RecordingNotifier {
    /// Wait (bounded) until `count` payloads have arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<NotificationPayload> {
        for _ in 0..200 {
            {
                let received = self.received.lock().unwrap();
                if received.len() >= count {
                    return received.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} notification(s)", count);
    }

    pub fn received(&self) -> Vec<NotificationPayload> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotificationError> {
        self.received.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _payload: &NotificationPayload) -> Result<(), NotificationError> {
        Err(NotificationError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }
}

pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    async fn send(&self, _payload: &NotificationPayload) -> Result<(), NotificationError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Always reports the same memory figures.
pub struct StaticResourceMonitor(pub MemoryUsage);

impl Default for StaticResourceMonitor {
    fn default() -> Self {
        Self(MemoryUsage {
            rss_mb: 64.5,
            vms_mb: 1024.25,
            percent: 0.8,
        })
    }
}

impl ResourceMonitor for StaticResourceMonitor {
    fn memory_usage(&self) -> MemoryUsage {
        self.0
    }
}

/// Static figures plus a count of how often memory was sampled.
#[derive(Default)]
pub struct CountingResourceMonitor {
    samples: AtomicUsize,
}

impl CountingResourceMonitor {
    pub fn samples(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }
}

impl ResourceMonitor for CountingResourceMonitor {
    fn memory_usage(&self) -> MemoryUsage {
        self.samples.fetch_add(1, Ordering::SeqCst);
        StaticResourceMonitor::default().0
    }
}
