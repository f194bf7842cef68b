//! JSON-in-text composite columns.
//!
//! Several project and phase columns hold a JSON array inside a `TEXT`
//! column. This module is the single place where those arrays are built from
//! form input, encoded for storage, and decoded for rendering.
//!
//! Decoding never fails: a `NULL`, malformed, or non-array value decodes to
//! an empty sequence so a damaged row still renders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator used when a list arrives as a single text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `"React, Node, Vue"` (tools).
    Comma,
    /// One entry per line (features, challenges, tasks, ...).
    Newline,
}

/// A list field as submitted: either already structured or a raw text blob.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Text(String),
}

impl Default for ListInput {
    fn default() -> Self {
        ListInput::Text(String::new())
    }
}

impl ListInput {
    /// Resolve to the sequence that will be stored.
    ///
    /// Structured input is kept exactly as given; text input is split on
    /// `separator`, trimmed, and empty entries are dropped.
    pub fn into_items(self, separator: Separator) -> Vec<String> {
        match self {
            ListInput::Items(items) => items,
            ListInput::Text(text) => split_list(&text, separator),
        }
    }
}

/// Split free text into trimmed, non-empty entries.
pub fn split_list(text: &str, separator: Separator) -> Vec<String> {
    let pieces: Box<dyn Iterator<Item = &str>> = match separator {
        Separator::Comma => Box::new(text.split(',')),
        Separator::Newline => Box::new(text.lines()),
    };
    pieces
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One picture in a project's gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: String,
}

/// Encode a string sequence for a JSON text column.
pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Encode a gallery for the `gallery_images` column.
pub fn encode_gallery(images: &[GalleryImage]) -> String {
    serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a string sequence from a JSON text column.
///
/// Scalar entries (numbers, booleans) are kept in their textual form; `null`,
/// object, and nested array entries are skipped.
pub fn decode_list(raw: Option<&str>) -> Vec<String> {
    let Some(Value::Array(values)) = parse_json(raw) else {
        return Vec::new();
    };
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

/// Decode the `gallery_images` column.
///
/// Older rows stored bare URL strings; those are lifted into a
/// [`GalleryImage`] with empty `alt`/`caption`. Objects without a `url` are
/// skipped.
pub fn decode_gallery(raw: Option<&str>) -> Vec<GalleryImage> {
    let Some(Value::Array(values)) = parse_json(raw) else {
        return Vec::new();
    };
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(url) if !url.trim().is_empty() => Some(GalleryImage {
                url,
                alt: String::new(),
                caption: String::new(),
            }),
            Value::Object(_) => serde_json::from_value::<GalleryImage>(value)
                .ok()
                .filter(|img| !img.url.trim().is_empty()),
            _ => None,
        })
        .collect()
}

fn parse_json(raw: Option<&str>) -> Option<Value> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok()
}
