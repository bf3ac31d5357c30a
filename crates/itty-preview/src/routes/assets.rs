//! Client app assets and the SPA fallback document.

use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;

use crate::state::AppState;

/// HTML must be revalidated so new deployments are picked up.
const HTML_CACHE_CONTROL: &str = "no-cache";

/// Built assets have content-hashed names and never change.
const ASSET_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Serve a file from the docs directory, or `index.html` when none matches.
pub async fn serve_static(state: &AppState, request: Request) -> Response {
    let response = match state.static_files.clone().oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    };
    with_cache_policy(response)
}

/// Set `Cache-Control` on successful responses by content type.
fn with_cache_policy(mut response: Response) -> Response {
    if !response.status().is_success() {
        return response;
    }

    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));

    let value = if is_html {
        HTML_CACHE_CONTROL
    } else {
        ASSET_CACHE_CONTROL
    };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    response
}
