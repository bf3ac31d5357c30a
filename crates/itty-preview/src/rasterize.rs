//! SVG-to-JPEG rasterization for preview images.
//!
//! Links may carry an image as inline markup instead of a URL. Crawlers only
//! accept raster images, so the renderer points `og:image` at
//! [`RASTERIZE_ROUTE`] and this module turns the payload back into a JPEG.
//!
//! Pipeline:
//! - recover the payload from the path suffix or the query string
//! - decode it (Base64, else percent-encoding)
//! - wrap bare fragments in an `<svg>` envelope
//! - render with resvg onto a white canvas, at most [`MAX_WIDTH`] wide
//! - encode as JPEG

use std::sync::LazyLock;

use image::codecs::jpeg::JpegEncoder;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::decode::{decode_base64_text, decode_percent};
use crate::error::RasterizeError;

/// Route prefix for rasterized images.
///
/// Kept at the path older deployments used so existing links still resolve.
pub const RASTERIZE_ROUTE: &str = "/.netlify/functions/rasterize";

/// Output width cap. Smaller images are never upscaled.
pub const MAX_WIDTH: u32 = 1200;

/// Upper bound on output pixels, about eight 1200x1200 frames.
pub const MAX_PIXELS: u64 = 1200 * 1200 * 8;

/// JPEG quality.
const JPEG_QUALITY: u8 = 80;

const SVG_OPEN: &str = "<svg";

/// Parse options shared by every request, with system fonts loaded once.
static SVG_OPTIONS: LazyLock<Options<'static>> = LazyLock::new(|| {
    let mut options = Options::default();
    options.fontdb_mut().load_system_fonts();
    tracing::info!(faces = options.fontdb.len(), "loaded system fonts");
    options
});

/// Recover the rasterize payload from a request URL (path plus query).
///
/// A non-empty query string wins and is taken whole. Otherwise the payload
/// is the path after [`RASTERIZE_ROUTE`], minus one leading `/`. Every `=`
/// is removed either way, so real `key=value` query parameters would
/// corrupt the payload. Returns an empty string when nothing is found.
pub fn extract_payload(original_url: &str) -> String {
    if !original_url.starts_with(RASTERIZE_ROUTE) {
        return String::new();
    }

    let mut parts = original_url.split('?');
    let path = parts.next().unwrap_or_default();
    let query = parts.next().unwrap_or_default();

    if !query.is_empty() {
        return query.replace('=', "");
    }

    let suffix = &path[RASTERIZE_ROUTE.len()..];
    suffix.strip_prefix('/').unwrap_or(suffix).replace('=', "")
}

/// Decode a payload into a standalone SVG document.
pub fn payload_to_svg(payload: &str) -> String {
    let markup = decode_base64_text(payload)
        .unwrap_or_else(|| decode_percent(payload).into_owned());

    if markup.starts_with(SVG_OPEN) {
        markup
    } else {
        format!(r#"<svg xmlns="http://www.w3.org/2000/svg">{markup}</svg>"#)
    }
}

/// Rasterize a payload off the async runtime.
///
/// All buffers are owned by the blocking task; if the caller goes away the
/// result is simply dropped.
pub async fn rasterize(payload: String) -> Result<Vec<u8>, RasterizeError> {
    tokio::task::spawn_blocking(move || svg_to_jpeg(&payload_to_svg(&payload))).await?
}

/// Render an SVG document to JPEG bytes.
pub fn svg_to_jpeg(svg: &str) -> Result<Vec<u8>, RasterizeError> {
    let tree = Tree::from_str(svg, &SVG_OPTIONS)?;

    let size = tree.size();
    let scale = if size.width() > MAX_WIDTH as f32 {
        MAX_WIDTH as f32 / size.width()
    } else {
        1.0
    };
    // Thin images keep at least one pixel on each side
    let width = ((size.width() * scale).round() as u32).max(1);
    let height = ((size.height() * scale).round() as u32).max(1);

    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(RasterizeError::InvalidSize { width, height });
    }

    let mut pixmap =
        Pixmap::new(width, height).ok_or(RasterizeError::InvalidSize { width, height })?;
    // JPEG has no alpha; flatten onto white like a browser would
    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // Opaque background, so premultiplied and straight RGB are identical
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let image = image::RgbImage::from_raw(width, height, rgb)
        .ok_or(RasterizeError::InvalidSize { width, height })?;

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&image)?;

    tracing::debug!(width, height, bytes = jpeg.len(), "rasterized svg");
    Ok(jpeg)
}
