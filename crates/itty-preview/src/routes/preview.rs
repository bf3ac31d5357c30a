//! Document paths: crawler previews, otherwise the client app.
//!
//! Every request that no other route claims lands here. Link-preview
//! crawlers asking for a document path get the server-rendered meta tags;
//! everyone else gets static assets or the SPA entry document.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::{assets, etag, user_agent};
use crate::crawler;
use crate::metadata::Metadata;
use crate::render;
use crate::state::AppState;

/// Fallback handler for all document and asset paths.
pub async fn document_handler(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path();
    let readable = matches!(*request.method(), Method::GET | Method::HEAD);

    if readable
        && crawler::is_metadata_request(
            path,
            user_agent(request.headers()),
            &state.config.metadata_bots,
        )
    {
        tracing::debug!(path = %path, "rendering crawler preview");
        return preview_response(path);
    }

    assets::serve_static(&state, request).await
}

/// Decode the path and render its preview tags.
fn preview_response(path: &str) -> Response {
    let metadata = Metadata::from_path(path);
    let html = render::render_metadata_document(&metadata);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    if let Some(tag) = etag(html.as_bytes()) {
        headers.insert(header::ETAG, tag);
    }

    (StatusCode::OK, headers, html).into_response()
}
