//! Decoders for the compact encodings used in document links.
//!
//! Every function here is total: a value that cannot be decoded degrades to a
//! less-interpreted form, ending with the literal input. None of them can fail
//! a request.

use std::borrow::Cow;
use std::sync::LazyLock;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::{Captures, Regex};

/// Prefix that marks a value as an absolute URL.
///
/// Matches both `http://` and `https://`. Links in the wild rely on this
/// loose check, so it is a compatibility rule rather than URL validation.
pub const ABSOLUTE_URL_PREFIX: &str = "http";

/// Standard alphabet, padding optional. Callers strip `=` before decoding
/// because path values lose or mangle padding in transit.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

static HYPHEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("-+").expect("hyphen run pattern is valid"));

/// Check whether a value should be treated as an absolute URL.
pub fn is_absolute_url(value: &str) -> bool {
    value.starts_with(ABSOLUTE_URL_PREFIX)
}

/// Decode a "pretty" path segment (title or description).
///
/// Hyphen runs are shorthand: `-` is a space, `--` a literal hyphen and
/// `---` a spaced dash. Any other run length collapses to a single `-`.
/// The result is then percent-decoded, keeping the hyphen-substituted text
/// if the escapes are malformed.
pub fn decode_segment(segment: &str) -> String {
    if segment.is_empty() {
        return String::new();
    }

    let spaced = HYPHEN_RUN.replace_all(segment, |caps: &Captures<'_>| match caps[0].len() {
        3 => " - ",
        2 => "-",
        1 => " ",
        _ => "-",
    });

    decode_percent(&spaced).into_owned()
}

/// Decode a value that holds a URL or an encoded text blob.
///
/// Order of attempts:
/// 1. absolute URLs (and empty values) are returned unchanged
/// 2. Base64 text, after removing every `=`
/// 3. percent-decoding of the original value
/// 4. the original value verbatim
pub fn decode_value(value: &str) -> String {
    if value.is_empty() || is_absolute_url(value) {
        return value.to_string();
    }

    let cleaned = value.replace('=', "");
    if let Some(text) = decode_base64_text(&cleaned) {
        return text;
    }

    tracing::trace!(value = %value, "value is not base64, percent-decoding");
    decode_percent(value).into_owned()
}

/// Decode Base64 into UTF-8 text.
///
/// Returns `None` when the input is not Base64 or the bytes are not valid
/// UTF-8, so the caller can fall back to another strategy.
pub fn decode_base64_text(value: &str) -> Option<String> {
    let bytes = BASE64.decode(value).ok()?;
    String::from_utf8(bytes).ok()
}

/// Percent-decode a value, returning it unchanged when decoding fails.
///
/// A `%` that is not followed by two hex digits, or escapes that decode to
/// invalid UTF-8, count as failure. `+` is left alone.
pub fn decode_percent(value: &str) -> Cow<'_, str> {
    if !has_well_formed_escapes(value) {
        tracing::debug!(value = %value, "malformed percent escape, keeping literal");
        return Cow::Borrowed(value);
    }

    match urlencoding::decode(value) {
        Ok(decoded) => decoded,
        Err(_) => {
            tracing::debug!(value = %value, "percent escapes are not utf-8, keeping literal");
            Cow::Borrowed(value)
        }
    }
}

fn has_well_formed_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1..i + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
            _ => return false,
        }
    }
    true
}
