//! Tag builders shared by the preview renderer.
//!
//! Every value is escaped by maud; decoded link content is untrusted.

use maud::{Markup, html};

/// Emoji image CDN used for emoji favicons.
pub const EMOJI_CDN_BASE: &str = "https://fonts.gstatic.com/s/e/notoemoji/14.0";

/// `<meta property=... content=...>` (Open Graph style).
pub fn meta_property(property: &str, content: &str) -> Markup {
    html! {
        meta property=(property) content=(content);
    }
}

/// `<meta name=... content=...>` (description, theme-color, Twitter card).
pub fn meta_name(name: &str, content: &str) -> Markup {
    html! {
        meta name=(name) content=(content);
    }
}

/// Favicon `<link>`.
pub fn icon_link(href: &str) -> Markup {
    html! {
        link rel="icon" type="image/png" href=(href);
    }
}

/// Build the CDN URL for an emoji favicon.
///
/// Each Unicode scalar becomes lowercase hex; compound emoji join their
/// code points with `_`.
pub fn emoji_favicon_url(emoji: &str) -> String {
    let codepoints: Vec<String> = emoji.chars().map(|c| format!("{:x}", u32::from(c))).collect();
    format!("{EMOJI_CDN_BASE}/{}/128.png", codepoints.join("_"))
}
