//! `/convert` response envelope and derived statistics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Round `value` to `places` decimal places, ties to even.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Byte count expressed in mebibytes, two decimal places.
pub fn bytes_to_mb(bytes: usize) -> f64 {
    round_to(bytes as f64 / BYTES_PER_MB, 2)
}

/// Size reduction as a percentage, one decimal place: `(1 - output/input) * 100`.
///
/// An empty input has nothing to compress and yields `0.0`, keeping the value finite.
pub fn compression_ratio(input_size: usize, output_size: usize) -> f64 {
    if input_size == 0 {
        return 0.0;
    }
    round_to((1.0 - output_size as f64 / input_size as f64) * 100.0, 1)
}

/// Resident memory samples taken around a conversion, in MB.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryFigures {
    /// RSS after the base64 copy of the output was built
    pub peak_mb: f64,
    /// RSS after the request's buffers were released
    pub final_mb: f64,
}

impl MemoryFigures {
    pub fn freed_mb(&self) -> f64 {
        round_to(self.peak_mb - self.final_mb, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionStats {
    pub input_size_mb: f64,
    pub output_size_mb: f64,
    /// Percentage saved relative to the JPEG input
    pub compression_ratio: f64,
    pub memory_peak_mb: f64,
    pub memory_freed_mb: f64,
    pub memory_final_mb: f64,
}

impl ConversionStats {
    pub fn new(input_size: usize, output_size: usize, memory: MemoryFigures) -> Self {
        Self {
            input_size_mb: bytes_to_mb(input_size),
            output_size_mb: bytes_to_mb(output_size),
            compression_ratio: compression_ratio(input_size, output_size),
            memory_peak_mb: memory.peak_mb,
            memory_freed_mb: memory.freed_mb(),
            memory_final_mb: memory.final_mb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FullSizeImage {
    /// Base64-encoded AVIF bytes
    pub data: String,
    /// Decoded AVIF size in bytes
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertSuccess {
    pub success: bool,
    pub full_size: FullSizeImage,
    pub stats: ConversionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConvertFailure {
    pub success: bool,
    pub error: String,
}

/// Envelope returned by `POST /convert`. The outcome is signalled in-band through
/// `success`; both variants are sent with HTTP 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ConvertResponse {
    Success(ConvertSuccess),
    Failure(ConvertFailure),
}

impl ConvertResponse {
    pub fn success(data: String, size: usize, stats: ConversionStats) -> Self {
        ConvertResponse::Success(ConvertSuccess {
            success: true,
            full_size: FullSizeImage { data, size },
            stats,
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ConvertResponse::Failure(ConvertFailure {
            success: false,
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConvertResponse::Success(_))
    }
}
