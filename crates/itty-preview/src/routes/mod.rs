//! Route definitions for the preview service.
//!
//! ## Routes
//!
//! - `GET /.netlify/functions/rasterize[/<payload>|?<payload>]` - Markup to JPEG
//! - `GET /{document path}/` - Preview tags for link-preview crawlers
//! - `GET /*` - Client app assets, falling back to `index.html`
//!
//! Paths under `/render/` and `/js/` also carry
//! `Access-Control-Allow-Origin: *`. Every route sits behind the user-agent
//! block list and response compression.

mod assets;
mod middleware;
mod preview;
mod rasterize;

use axum::Router;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::routing::{MethodRouter, any, get};
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::rasterize::RASTERIZE_ROUTE;
use crate::state::AppState;

/// Path prefixes whose responses may be embedded from other origins.
const CROSS_ORIGIN_PREFIXES: &[&str] = &["/render", "/js"];

/// Build the complete preview service router.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(RASTERIZE_ROUTE, get(rasterize::rasterize_handler))
        .route(
            &format!("{RASTERIZE_ROUTE}/"),
            get(rasterize::rasterize_handler),
        )
        .route(
            &format!("{RASTERIZE_ROUTE}/{{*payload}}"),
            get(rasterize::rasterize_handler),
        );

    // Same document handling as the fallback, plus the open CORS header
    for prefix in CROSS_ORIGIN_PREFIXES {
        router = router
            .route(&format!("{prefix}/"), cross_origin_documents())
            .route(&format!("{prefix}/{{*path}}"), cross_origin_documents());
    }

    router
        .fallback(preview::document_handler)
        .layer(CompressionLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::reject_blocked_agents,
        ))
        .with_state(state)
}

fn cross_origin_documents() -> MethodRouter<AppState> {
    any(preview::document_handler).layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    ))
}

/// User agent of a request, empty when absent or not valid text.
fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Strong ETag (xxHash of the body).
fn etag(body: &[u8]) -> Option<HeaderValue> {
    let hash = xxhash_rust::xxh3::xxh3_64(body);
    HeaderValue::from_str(&format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()))).ok()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use base64::Engine;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    const TWITTER_UA: &str = "Twitterbot/1.0";
    const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) Safari/605.1.15";
    const INDEX_HTML: &str = "<!doctype html><title>app</title>";

    struct TestApp {
        router: Router,
        _docs: TempDir,
    }

    fn app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
        let docs = tempfile::tempdir().unwrap();
        fs::write(docs.path().join("index.html"), INDEX_HTML).unwrap();
        fs::create_dir(docs.path().join("js")).unwrap();
        fs::write(docs.path().join("js/app.js"), "console.log(1)").unwrap();

        let mut config = Config {
            docs_dir: docs.path().to_path_buf(),
            ..Config::default()
        };
        configure(&mut config);

        TestApp {
            router: router(AppState::new(config)),
            _docs: docs,
        }
    }

    fn app() -> TestApp {
        app_with(|_| {})
    }

    async fn get_as(app: &TestApp, uri: &str, agent: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .header(header::USER_AGENT, agent)
            .body(Body::empty())
            .unwrap();
        app.router.clone().oneshot(request).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn body_string(response: Response) -> String {
        String::from_utf8(body_bytes(response).await).unwrap()
    }

    fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn b64(text: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(text)
    }

    // -- crawler previews --

    #[tokio::test]
    async fn crawler_gets_preview_tags() {
        let app = app();
        let response = get_as(&app, "/My-Title/d/Some--Desc/c/ff0000/", TWITTER_UA).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_str(&response, header::CONTENT_TYPE),
            Some("text/html; charset=utf-8")
        );
        assert!(response.headers().contains_key(header::ETAG));

        let body = body_string(response).await;
        assert!(body.starts_with(r#"<meta charset="UTF-8">"#));
        assert!(body.contains("<title>My Title</title>"));
        assert!(body.contains(r#"<meta property="og:description" content="Some-Desc">"#));
        assert!(body.contains(r##"<meta name="theme-color" content="#ff0000">"##));
    }

    #[tokio::test]
    async fn browser_gets_client_app() {
        let app = app();
        let response = get_as(&app, "/My-Title/d/Some--Desc/", BROWSER_UA).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CACHE_CONTROL), Some("no-cache"));
        assert_eq!(body_string(response).await, INDEX_HTML);
    }

    #[tokio::test]
    async fn crawler_at_root_gets_client_app() {
        let app = app();
        let response = get_as(&app, "/", TWITTER_UA).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, INDEX_HTML);
    }

    #[tokio::test]
    async fn crawler_without_trailing_slash_gets_client_app() {
        let app = app();
        let response = get_as(&app, "/foo", TWITTER_UA).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, INDEX_HTML);
    }

    #[tokio::test]
    async fn custom_bot_list_from_config() {
        let app = app_with(|config| config.metadata_bots = vec!["MyUnfurler".to_string()]);

        let response = get_as(&app, "/Hello/", "MyUnfurler/2").await;
        assert!(body_string(response).await.contains("<title>Hello</title>"));

        let response = get_as(&app, "/Hello/", TWITTER_UA).await;
        assert_eq!(body_string(response).await, INDEX_HTML);
    }

    #[tokio::test]
    async fn post_is_never_a_preview() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/Hello/")
            .header(header::USER_AGENT, TWITTER_UA)
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_ne!(
            header_str(&response, header::CONTENT_TYPE),
            Some("text/html; charset=utf-8")
        );
    }

    // -- static assets --

    #[tokio::test]
    async fn asset_is_immutable_and_cross_origin() {
        let app = app();
        let response = get_as(&app, "/js/app.js", BROWSER_UA).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_str(&response, header::CACHE_CONTROL),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            header_str(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("*")
        );
        assert_eq!(body_string(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn render_paths_are_cross_origin() {
        let app = app();
        for uri in ["/render/", "/render/embed"] {
            let response = get_as(&app, uri, BROWSER_UA).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(
                header_str(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
                Some("*"),
                "{uri}"
            );
            assert_eq!(body_string(response).await, INDEX_HTML);
        }
    }

    #[tokio::test]
    async fn crawler_preview_under_cross_origin_prefix() {
        let app = app();
        let response = get_as(&app, "/js/Hello/", TWITTER_UA).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_str(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("*")
        );
        assert!(body_string(response).await.contains("<title>js</title>"));
    }

    #[tokio::test]
    async fn other_paths_not_cross_origin() {
        let app = app();
        for uri in ["/index.html", "/jsx/app.js", "/My-Title/js/x/"] {
            let response = get_as(&app, uri, BROWSER_UA).await;
            assert!(
                !response
                    .headers()
                    .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
                "{uri}"
            );
        }
    }

    // -- access gate --

    #[tokio::test]
    async fn blocked_agent_refused_everywhere() {
        let app = app_with(|config| config.blocked_agents = vec!["BadBot".to_string()]);

        for uri in ["/", "/Hello/", "/js/app.js", "/.netlify/functions/rasterize?abc"] {
            let response = get_as(&app, uri, "BadBot/1.0").await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
            assert!(body_bytes(response).await.is_empty());
        }

        let response = get_as(&app, "/", BROWSER_UA).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // -- rasterize --

    #[tokio::test]
    async fn rasterize_without_payload_is_bad_request() {
        let app = app();
        for uri in [
            RASTERIZE_ROUTE.to_string(),
            format!("{RASTERIZE_ROUTE}/"),
            format!("{RASTERIZE_ROUTE}?=="),
        ] {
            let response = get_as(&app, &uri, BROWSER_UA).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                body_string(response).await,
                r#"{"error":"Missing payload"}"#
            );
        }
    }

    #[tokio::test]
    async fn rasterize_path_payload() {
        let app = app();
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="2400" height="600"><rect width="2400" height="600" fill="#08f"/></svg>"##;
        let uri = format!("{RASTERIZE_ROUTE}/{}", b64(svg));
        let response = get_as(&app, &uri, TWITTER_UA).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CONTENT_TYPE), Some("image/jpeg"));
        assert_eq!(
            header_str(&response, header::CACHE_CONTROL),
            Some("public, max-age=300")
        );

        let bytes = body_bytes(response).await;
        let image = image::load_from_memory(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (1200, 300));
    }

    #[tokio::test]
    async fn rasterize_query_payload() {
        let app = app();
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="32"></svg>"#;
        let uri = format!("{RASTERIZE_ROUTE}?{}", b64(svg));
        let response = get_as(&app, &uri, BROWSER_UA).await;

        assert_eq!(response.status(), StatusCode::OK);
        let image = image::load_from_memory(&body_bytes(response).await).unwrap();
        assert_eq!((image.width(), image.height()), (64, 32));
    }

    #[tokio::test]
    async fn rasterize_malformed_svg_is_server_error() {
        let app = app();
        let uri = format!("{RASTERIZE_ROUTE}/%3Csvg");
        let response = get_as(&app, &uri, BROWSER_UA).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Internal Server Error"}"#
        );
    }

    #[tokio::test]
    async fn preview_image_served_by_rasterizer() {
        let app = app();
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="150"><circle cx="75" cy="75" r="50"/></svg>"#;
        let encoded = b64(svg).replace('=', "");
        let response = get_as(&app, &format!("/Card/i/{encoded}/"), TWITTER_UA).await;
        let body = body_string(response).await;

        let marker = r#"<meta property="og:image" content=""#;
        let start = body.find(marker).expect("og:image tag") + marker.len();
        let end = start + body[start..].find('"').unwrap();
        let image_url = &body[start..end];
        assert!(image_url.starts_with(RASTERIZE_ROUTE));

        let response = get_as(&app, image_url, TWITTER_UA).await;
        assert_eq!(response.status(), StatusCode::OK);
        let image = image::load_from_memory(&body_bytes(response).await).unwrap();
        assert_eq!((image.width(), image.height()), (300, 150));
    }
}
