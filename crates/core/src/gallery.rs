//! Gallery composition rules: upload acceptance, stored file naming, manual
//! URL parsing, and merge order.

use rand::Rng;

use crate::composite::GalleryImage;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted size of one uploaded image (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Declared content types accepted for gallery uploads.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// `alt` text for manually entered URLs and untitled uploads.
pub const DEFAULT_ALT: &str = "Gallery image";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Why an uploaded file was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("unsupported content type '{0}'")]
    UnsupportedType(String),

    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("file is empty")]
    Empty,
}

/// Check the declared content type and size of one upload.
pub fn validate_upload(content_type: &str, size: u64) -> Result<(), UploadRejection> {
    let normalized = content_type.trim().to_ascii_lowercase();
    if !ALLOWED_CONTENT_TYPES.contains(&normalized.as_str()) {
        return Err(UploadRejection::UnsupportedType(content_type.to_string()));
    }
    if size == 0 {
        return Err(UploadRejection::Empty);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Extension for a stored upload: the original one, lower-cased, or one
/// derived from the content type when the original name has none.
pub fn upload_extension(original_name: &str, content_type: &str) -> String {
    let from_name = std::path::Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_name {
        return ext;
    }
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
    .to_string()
}

/// Build a collision-resistant file name for an upload.
///
/// Format: `gallery_{unix_millis}_{index}_{8 hex digits}.{ext}`.
pub fn stored_file_name(unix_millis: i64, index: usize, extension: &str) -> String {
    let random: u32 = rand::rng().random();
    format!("gallery_{unix_millis}_{index}_{random:08x}.{extension}")
}

/// Caption derived from an original file name: stem with `-`/`_` turned into
/// spaces.
pub fn caption_from_filename(original_name: &str) -> String {
    let stem = std::path::Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    stem.replace(['-', '_'], " ").trim().to_string()
}

// ---------------------------------------------------------------------------
// Manual URLs and merge
// ---------------------------------------------------------------------------

/// Parse newline-separated manually entered URLs into gallery entries.
pub fn parse_manual_urls(text: &str) -> Vec<GalleryImage> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|url| GalleryImage {
            url: url.to_string(),
            alt: DEFAULT_ALT.to_string(),
            caption: String::new(),
        })
        .collect()
}

/// Final gallery order: uploaded entries first, manual entries after.
pub fn merge_gallery(uploaded: Vec<GalleryImage>, manual: Vec<GalleryImage>) -> Vec<GalleryImage> {
    let mut merged = uploaded;
    merged.extend(manual);
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
