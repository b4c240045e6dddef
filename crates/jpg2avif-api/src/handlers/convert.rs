//! `POST /convert`
//!
//! Order of work per request: validate content type, read the upload, convert, build the
//! envelope, dispatch the notification. Everything after the upload is read is reported
//! in-band with HTTP 200; only pre-conversion failures produce an error status.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use jpg2avif_core::models::{
    bytes_to_mb, round_to, ConversionStats, ConvertResponse, MemoryFigures, NotificationPayload,
};
use jpg2avif_core::{AppError, ErrorMetadata};
use jpg2avif_infra::ResourceMonitor;
use jpg2avif_processing::ConversionRequest;

use crate::error::{log_error, ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_jpeg_upload;

/// Inputs above this size are expected to give back at least [`LEAK_FREED_THRESHOLD_MB`]
/// once their buffers are released.
const LEAK_CHECK_INPUT_BYTES: usize = 5 * 1024 * 1024;
const LEAK_FREED_THRESHOLD_MB: f64 = 1.0;

/// Convert an uploaded JPEG to AVIF
///
/// Expects a multipart form with the JPEG in the `image` field (`file` is accepted too),
/// declared as `image/jpeg`. The AVIF is returned base64-encoded.
#[utoipa::path(
    post,
    path = "/convert",
    tag = "conversion",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Conversion outcome; check `success`", body = ConvertResponse),
        (status = 400, description = "Not a JPEG upload or malformed form", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Upload could not be read", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "convert_image"))]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>, HttpAppError> {
    let resources = state.resources.as_ref();
    let rss_start = resources.rss_mb();
    tracing::info!(rss_mb = rss_start, "Memory before conversion");

    let upload = read_jpeg_upload(multipart?).await?;
    let input_size = upload.data.len();
    let original_filename = upload.filename.clone();
    log_memory_step(resources, "Upload read", rss_start);
    tracing::info!(
        filename = %original_filename,
        input_size_mb = bytes_to_mb(input_size),
        "Received JPEG upload"
    );

    let request = ConversionRequest::new(upload.data, upload.filename);
    let started = Instant::now();
    let result = state.converter.convert(&request).await;
    let processing_time = started.elapsed().as_millis() as u64;
    drop(request);

    let (response, payload) = match result {
        Ok(image) => {
            log_memory_step(resources, "Conversion finished", rss_start);

            let output_size = image.data.len();
            let encoded = STANDARD.encode(&image.data);
            let peak_mb = resources.rss_mb();
            tracing::info!(
                rss_mb = peak_mb,
                delta_mb = round_to(peak_mb - rss_start, 2),
                "Output encoded as base64"
            );

            let converted_filename = image.filename;
            drop(image.data);

            let final_mb = resources.rss_mb();
            let memory = MemoryFigures { peak_mb, final_mb };
            tracing::info!(
                rss_mb = final_mb,
                freed_mb = memory.freed_mb(),
                "Buffers released"
            );
            if memory.freed_mb() < LEAK_FREED_THRESHOLD_MB && input_size > LEAK_CHECK_INPUT_BYTES {
                tracing::warn!(
                    freed_mb = memory.freed_mb(),
                    input_size_mb = bytes_to_mb(input_size),
                    "Potential memory leak: little memory freed after a large conversion"
                );
            }

            let stats = ConversionStats::new(input_size, output_size, memory);
            tracing::info!(
                filename = %converted_filename,
                output_size_mb = stats.output_size_mb,
                compression_ratio = stats.compression_ratio,
                processing_time_ms = processing_time,
                "Conversion succeeded"
            );

            let payload = NotificationPayload::succeeded(
                original_filename,
                converted_filename,
                input_size,
                output_size,
                stats.compression_ratio,
                processing_time,
            );
            (ConvertResponse::success(encoded, output_size, stats), payload)
        }
        Err(err) => {
            let app_error = AppError::from(err);
            log_error(&app_error);
            log_memory_step(resources, "Conversion failed", rss_start);

            let message = app_error.client_message();
            let payload = NotificationPayload::failed(
                original_filename,
                input_size,
                message.clone(),
                processing_time,
            );
            (ConvertResponse::failure(message), payload)
        }
    };

    let notification = &state.config.notification;
    state.notifier.dispatch(payload.with_destination(
        notification.bucket_name.clone(),
        notification.folder_path.clone(),
    ));

    Ok(Json(response))
}

fn log_memory_step(resources: &dyn ResourceMonitor, step: &'static str, baseline_mb: f64) {
    let rss_mb = resources.rss_mb();
    tracing::info!(
        step,
        rss_mb,
        delta_mb = round_to(rss_mb - baseline_mb, 2),
        "Memory sample"
    );
}
