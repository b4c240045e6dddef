//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use jpg2avif_core::models;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "jpg2avif API",
        version = "0.1.0",
        description = "Converts JPEG uploads to AVIF with the avifenc encoder and returns the result base64-encoded with size and compression statistics."
    ),
    paths(
        handlers::health::health_check,
        handlers::convert::convert_image,
    ),
    components(
        schemas(
            models::HealthResponse,
            models::MemoryUsage,
            models::ConvertResponse,
            models::ConvertSuccess,
            models::ConvertFailure,
            models::FullSizeImage,
            models::ConversionStats,
            models::NotificationPayload,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service liveness"),
        (name = "conversion", description = "JPEG to AVIF conversion"),
    )
)]
pub struct ApiDoc;
