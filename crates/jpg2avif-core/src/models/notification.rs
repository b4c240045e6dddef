use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body posted to the notification endpoint after every `/convert` attempt that reached
/// the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub original_filename: String,
    pub converted_filename: Option<String>,
    pub success: bool,
    /// AVIF size in bytes
    pub file_size: Option<usize>,
    /// JPEG size in bytes
    pub original_size: usize,
    pub compression_ratio: Option<f64>,
    /// Wall-clock milliseconds spent handling the request
    pub processing_time: u64,
    pub bucket_name: Option<String>,
    pub folder_path: Option<String>,
    pub error: Option<String>,
}

impl NotificationPayload {
    pub fn succeeded(
        original_filename: impl Into<String>,
        converted_filename: impl Into<String>,
        original_size: usize,
        file_size: usize,
        compression_ratio: f64,
        processing_time: u64,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            converted_filename: Some(converted_filename.into()),
            success: true,
            file_size: Some(file_size),
            original_size,
            compression_ratio: Some(compression_ratio),
            processing_time,
            bucket_name: None,
            folder_path: None,
            error: None,
        }
    }

    pub fn failed(
        original_filename: impl Into<String>,
        original_size: usize,
        error: impl Into<String>,
        processing_time: u64,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            converted_filename: None,
            success: false,
            file_size: None,
            original_size,
            compression_ratio: None,
            processing_time,
            bucket_name: None,
            folder_path: None,
            error: Some(error.into()),
        }
    }

    /// Attach the configured storage destination.
    pub fn with_destination(
        mut self,
        bucket_name: Option<String>,
        folder_path: Option<String>,
    ) -> Self {
        self.bucket_name = bucket_name;
        self.folder_path = folder_path;
        self
    }
}
