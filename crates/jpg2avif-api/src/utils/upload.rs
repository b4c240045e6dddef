//! Multipart upload extraction for `/convert`

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use jpg2avif_core::AppError;

/// The only declared content type `/convert` accepts.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
pub const JPEG_ONLY_MESSAGE: &str = "Only JPEG images are supported.";
pub const DEFAULT_FILENAME: &str = "image.jpg";

/// Field names the image may be sent under.
const UPLOAD_FIELDS: [&str; 2] = ["image", "file"];

#[derive(Debug)]
pub struct JpegUpload {
    pub data: Bytes,
    pub filename: String,
}

/// Extract the JPEG part from the form.
///
/// The declared content type is checked before any of the part's body is read.
/// Fields with other names are skipped.
pub async fn read_jpeg_upload(mut multipart: Multipart) -> Result<JpegUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart"))?
    {
        let is_upload = field
            .name()
            .map(|name| UPLOAD_FIELDS.contains(&name))
            .unwrap_or(false);
        if !is_upload {
            continue;
        }

        if field.content_type() != Some(JPEG_CONTENT_TYPE) {
            tracing::debug!(
                content_type = ?field.content_type(),
                "Rejected upload with non-JPEG content type"
            );
            return Err(AppError::InvalidContentType(JPEG_ONLY_MESSAGE.to_string()));
        }

        let filename = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();

        let data = field.bytes().await.map_err(|e| {
            let err = multipart_error(e, "Failed to read file data");
            match err {
                AppError::InvalidInput(msg) => AppError::ReadFailure(msg),
                other => other,
            }
        })?;

        return Ok(JpegUpload { data, filename });
    }

    Err(AppError::InvalidInput(
        "No file provided; send the image in a multipart field named 'image'".to_string(),
    ))
}

fn multipart_error(err: MultipartError, context: &str) -> AppError {
    let status = err.status();
    let message = format!("{}: {}", context, err.body_text());

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else if status.is_client_error() {
        AppError::InvalidInput(message)
    } else {
        AppError::ReadFailure(message)
    }
}
