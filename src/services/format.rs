//! Content type detection and MIME/extension tables
//!
//! Signature inspection only looks at the first [`SIGNATURE_LEN`] bytes and
//! knows a fixed set of formats. Anything else is `application/octet-stream`.

use std::path::Path;

/// Number of leading bytes inspected for signatures
pub const SIGNATURE_LEN: usize = 12;

pub const PNG: &str = "image/png";
pub const JPEG: &str = "image/jpeg";
pub const WEBP: &str = "image/webp";
pub const GIF: &str = "image/gif";
pub const OCTET_STREAM: &str = "application/octet-stream";

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_MAGIC: &[u8] = b"WEBP";
const GIF_MAGIC: &[u8] = b"GIF";

/// Infer a content type from the leading bytes.
///
/// Checked in order: PNG, JPEG, WebP (`RIFF` at 0 and `WEBP` at 8), GIF.
///
/// # Examples
/// ```rust
/// use bgremove_api::services::format::detect_content_type;
///
/// assert_eq!(detect_content_type(&[0x89, b'P', b'N', b'G', 0x0D]), "image/png");
/// assert_eq!(detect_content_type(b"hello"), "application/octet-stream");
/// ```
pub fn detect_content_type(bytes: &[u8]) -> &'static str {
    let head = bytes.get(..SIGNATURE_LEN).unwrap_or(bytes);

    if head.starts_with(PNG_MAGIC) {
        PNG
    } else if head.starts_with(JPEG_MAGIC) {
        JPEG
    } else if head.starts_with(RIFF_MAGIC) && head.get(8..12) == Some(WEBP_MAGIC) {
        WEBP
    } else if head.starts_with(GIF_MAGIC) {
        GIF
    } else {
        OCTET_STREAM
    }
}

/// Content type for a known image file extension (case-insensitive)
pub fn content_type_from_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some(PNG),
        "jpg" | "jpeg" => Some(JPEG),
        "webp" => Some(WEBP),
        "gif" => Some(GIF),
        _ => None,
    }
}

/// Content type implied by a path's extension, if it has a known one
pub fn content_type_from_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(content_type_from_extension)
}

/// File extension for a content type, `bin` for anything unknown
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        PNG => "png",
        JPEG => "jpg",
        WEBP => "webp",
        GIF => "gif",
        _ => "bin",
    }
}

/// Fallback upload name such as `image.png`
pub fn fallback_filename(content_type: &str) -> String {
    format!("image.{}", extension_for_content_type(content_type))
}

/// Whether `value` looks like a `type/subtype` MIME string
pub fn is_valid_mime(value: &str) -> bool {
    value.parse::<reqwest::header::HeaderValue>().is_ok()
        && value
            .split(';')
            .next()
            .and_then(|essence| essence.trim().split_once('/'))
            .is_some_and(|(ty, sub)| is_token(ty) && is_token(sub))
}

fn is_token(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-".contains(c))
}
