use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use jpg2avif_core::models::NotificationPayload;
use jpg2avif_core::NotificationConfig;
use reqwest::Client;

use super::{NotificationError, Notifier};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Posts payloads as JSON to `<base-url>/conversion-complete`.
#[derive(Clone)]
pub struct HttpNotifier {
    http_client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("jpg2avif/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client for notifications")?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint(),
            timeout: config.timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Timeout(self.timeout)
                } else {
                    NotificationError::Request(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Failed to read response body"));

        Err(NotificationError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn payload() -> NotificationPayload {
        NotificationPayload::succeeded("photo.jpg", "photo.avif", 2048, 512, 75.0, 12)
    }

    fn notifier_for(base_url: String, timeout_secs: u64) -> HttpNotifier {
        HttpNotifier::new(&NotificationConfig {
            base_url,
            timeout_secs,
            ..NotificationConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_posts_json_payload_to_conversion_complete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/conversion-complete")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "originalFilename": "photo.jpg",
                "convertedFilename": "photo.avif",
                "success": true,
                "fileSize": 512,
                "originalSize": 2048,
                "error": null
            })))
            .with_status(200)
            .create_async()
            .await;

        let notifier = notifier_for(server.url(), 5);
        assert_eq!(
            notifier.endpoint(),
            format!("{}/conversion-complete", server.url())
        );
        notifier.send(&payload()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/conversion-complete")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = notifier_for(server.url(), 5)
            .send(&payload())
            .await
            .unwrap_err();

        match err {
            NotificationError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = notifier_for(format!("http://{}", addr), 5)
            .send(&payload())
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationError::Request(_)));
    }

    #[tokio::test]
    async fn test_unresponsive_endpoint_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _accept = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let err = notifier_for(format!("http://{}", addr), 1)
            .send(&payload())
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationError::Timeout(_)));
        assert_eq!(err.to_string(), "Notification timed out after 1s");
    }
}
