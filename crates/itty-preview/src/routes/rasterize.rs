//! Rasterize route: inline markup in, JPEG out.
//!
//! Handles `GET /.netlify/functions/rasterize[/<payload>]` and
//! `GET /.netlify/functions/rasterize?<payload>`.

use axum::extract::OriginalUri;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::etag;
use crate::error::PreviewError;
use crate::rasterize;

/// Same payload always yields the same image; let clients and CDNs keep it
/// for a few minutes.
const RASTER_CACHE_CONTROL: &str = "public, max-age=300";

/// Rasterize the payload carried by the request URL.
pub async fn rasterize_handler(OriginalUri(uri): OriginalUri) -> Result<Response, PreviewError> {
    let original = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());

    let payload = rasterize::extract_payload(original);
    if payload.is_empty() {
        return Err(PreviewError::MissingPayload);
    }

    tracing::debug!(payload_len = payload.len(), "rasterizing payload");
    let jpeg = rasterize::rasterize(payload).await?;

    Ok(jpeg_response(jpeg))
}

/// Build an HTTP response with JPEG content and cache headers.
fn jpeg_response(jpeg: Vec<u8>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(RASTER_CACHE_CONTROL),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    if let Some(tag) = etag(&jpeg) {
        headers.insert(header::ETAG, tag);
    }

    (StatusCode::OK, headers, jpeg).into_response()
}
