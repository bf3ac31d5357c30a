//! Error types for the preview service.
//!
//! Decoding never fails; only the rasterize route and the user-agent gate
//! produce error responses. Bodies are small JSON objects.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Preview service error type.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// The rasterize route was called without a payload.
    #[error("missing payload")]
    MissingPayload,

    /// The user agent is on the block list.
    #[error("unauthorized user agent")]
    Unauthorized,

    /// The payload could not be turned into an image.
    #[error("rasterize error: {0}")]
    Rasterize(#[from] RasterizeError),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Failures while turning markup into a JPEG.
#[derive(Debug, thiserror::Error)]
pub enum RasterizeError {
    #[error("svg parse error: {0}")]
    Parse(#[from] resvg::usvg::Error),

    #[error("unsupported canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("jpeg encode error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("rasterize task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for PreviewError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            Self::MissingPayload => (StatusCode::BAD_REQUEST, "Missing payload"),
            Self::Unauthorized => return StatusCode::UNAUTHORIZED.into_response(),
            Self::Rasterize(err) => {
                tracing::error!(error = %err, "rasterization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
