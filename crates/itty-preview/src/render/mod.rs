//! Preview rendering for link-unfurling crawlers.
//!
//! Turns a decoded [`Metadata`] into the ordered sequence of `<meta>`,
//! `<title>` and `<link>` tags that Open Graph and Twitter-card consumers
//! read. The output is a bare fragment; crawlers parse it without an
//! `<html>` wrapper. Some crawlers only read the first few tags, so the
//! order below is fixed.

pub mod components;

use maud::{Markup, html};

use self::components::{emoji_favicon_url, icon_link, meta_name, meta_property};
use crate::decode::{decode_value, is_absolute_url};
use crate::metadata::{Metadata, field};
use crate::rasterize::RASTERIZE_ROUTE;

/// Favicon values longer than this (in UTF-16 code units) are treated as an
/// encoded image URL; shorter ones as emoji.
///
/// A heuristic that existing links depend on, not a protocol boundary.
pub const FAVICON_EMOJI_MAX_LEN: usize = 9;

/// Render the full preview fragment, one tag per line.
pub fn render_metadata_document(metadata: &Metadata) -> String {
    metadata_tags(metadata)
        .into_iter()
        .map(Markup::into_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the preview tags in emission order.
pub fn metadata_tags(metadata: &Metadata) -> Vec<Markup> {
    let mut tags = vec![html! { meta charset="UTF-8"; }];

    if !metadata.title.is_empty() {
        tags.push(html! { title { (metadata.title) } });
        tags.push(meta_property("og:title", &metadata.title));
    }

    if let Some(site_name) = metadata.get(field::SITE_NAME) {
        tags.push(meta_property("og:site_name", site_name));
    }

    if let Some(og_type) = metadata.get(field::TYPE) {
        tags.push(meta_property("og:type", og_type));
    }

    if let Some(description) = metadata.get(field::DESCRIPTION) {
        tags.push(meta_property("og:description", description));
        tags.push(meta_name("description", description));
    }

    if let Some(color) = metadata.get(field::THEME_COLOR) {
        tags.push(meta_name("theme-color", &format!("#{color}")));
    }

    if let Some(raw) = metadata.get(field::IMAGE) {
        let image = image_url(raw);
        if !image.is_empty() {
            tags.push(meta_property("og:image", &image));
            if let Some(width) = metadata.get(field::IMAGE_WIDTH) {
                tags.push(meta_property("og:image:width", width));
            }
            if let Some(height) = metadata.get(field::IMAGE_HEIGHT) {
                tags.push(meta_property("og:image:height", height));
            }
            tags.push(meta_name("twitter:card", "summary_large_image"));
        }
    }

    if let Some(raw) = metadata.get(field::VIDEO) {
        let video = decode_value(raw);
        if !video.is_empty() {
            tags.push(meta_property("og:video", &video));
            if let Some(width) = metadata.get(field::VIDEO_WIDTH) {
                tags.push(meta_property("og:video:width", width));
            }
            if let Some(height) = metadata.get(field::VIDEO_HEIGHT) {
                tags.push(meta_property("og:video:height", height));
            }
        }
    }

    if let Some(favicon) = metadata.get(field::FAVICON) {
        if favicon.encode_utf16().count() > FAVICON_EMOJI_MAX_LEN {
            let href = decode_value(favicon);
            if !href.is_empty() {
                tags.push(icon_link(&href));
            }
        } else {
            tags.push(icon_link(&emoji_favicon_url(favicon)));
        }
    }

    tags
}

/// Resolve the `og:image` URL for an image field.
///
/// Anything that does not decode to an absolute URL is assumed to be inline
/// markup and is served through the rasterizer. The markup is
/// percent-encoded into the path so `=` and `/` inside it survive payload
/// extraction.
fn image_url(raw: &str) -> String {
    let decoded = decode_value(raw);
    if decoded.is_empty() || is_absolute_url(&decoded) {
        return decoded;
    }
    format!("{RASTERIZE_ROUTE}/{}", urlencoding::encode(&decoded))
}
