//! Field extraction from document paths.
//!
//! A document link looks like
//!
//! ```text
//! /{title}/{key}/{value}/{key}/{value}/...
//! ```
//!
//! The first segment is always the title. The rest are consumed in pairs.
//! Keys are short and not validated; unknown keys are kept but ignored by
//! the renderer.

use crate::decode::{decode_percent, decode_segment};

/// Recognised field keys.
pub mod field {
    /// Site name (`og:site_name`).
    pub const SITE_NAME: &str = "s";
    /// Open Graph type (`og:type`).
    pub const TYPE: &str = "t";
    /// Description, encoded like the title.
    pub const DESCRIPTION: &str = "d";
    /// Theme color as hex without the leading `#`.
    pub const THEME_COLOR: &str = "c";
    /// Image URL or encoded image markup.
    pub const IMAGE: &str = "i";
    pub const IMAGE_WIDTH: &str = "iw";
    pub const IMAGE_HEIGHT: &str = "ih";
    /// Video URL or encoded video URL.
    pub const VIDEO: &str = "v";
    pub const VIDEO_WIDTH: &str = "vw";
    pub const VIDEO_HEIGHT: &str = "vh";
    /// Favicon: a short emoji string or an encoded image URL.
    pub const FAVICON: &str = "f";
}

/// Decoded fields of a single document link.
///
/// Insertion order is kept. A repeated key overwrites the earlier value but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title, from the first path segment. May be empty.
    pub title: String,
    fields: Vec<(String, String)>,
}

impl Metadata {
    /// Build the field mapping for a request path.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let mut segments = trimmed.split('/');

        let mut metadata = Self {
            title: decode_segment(segments.next().unwrap_or_default()),
            fields: Vec::new(),
        };

        // Pairs with a missing or empty half are dropped
        while let Some(key) = segments.next() {
            let Some(value) = segments.next() else {
                break;
            };
            if key.is_empty() || value.is_empty() {
                continue;
            }
            metadata.insert(key, decode_field(key, value));
        }

        metadata
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a field, replacing any previous value for the key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Iterate over all fields (excluding the title) in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields (excluding the title).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the path carried no fields beyond the title.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decode one value according to its key.
///
/// The description uses the pretty segment encoding. Any other value is
/// percent-decoded only when it contains a literal `%`; values without one
/// are stored as-is so nothing is decoded twice. Existing links depend on
/// this exact rule.
fn decode_field(key: &str, value: &str) -> String {
    if key == field::DESCRIPTION {
        decode_segment(value)
    } else if value.contains('%') {
        decode_percent(value).into_owned()
    } else {
        value.to_string()
    }
}
