//! Content-type detection.
//!
//! Magic bytes decide first; the file extension is only consulted when the
//! content is not recognised or cannot be read.

use crate::constants::{DEFAULT_CONTENT_TYPE, EXTENSION_CONTENT_TYPES};
use std::path::Path;

pub trait Classifier: Send + Sync {
    /// Returns the content type of `path`. Never fails: unknown content maps
    /// to `application/octet-stream`.
    fn classify(&self, path: &Path) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContentSniffer;

impl ContentSniffer {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for ContentSniffer {
    fn classify(&self, path: &Path) -> String {
        match infer::get_from_path(path) {
            Ok(Some(kind)) => kind.mime_type().to_string(),
            _ => content_type_from_extension(path).to_string(),
        }
    }
}

pub fn content_type_from_extension(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .and_then(|ext| {
            EXTENSION_CONTENT_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, content_type)| *content_type)
        })
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Strips parameters and lowercases: `Text/Plain; charset=utf-8` -> `text/plain`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
