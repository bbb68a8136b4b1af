//! Input format detection.

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected.
const SNIFF_LEN: usize = 512;

/// UTF-8 byte order mark.
pub(crate) const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Supported input format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Viewer HTML with page containers
    Html,
    /// Serialized [`crate::Document`]
    Json,
    /// Plain text, pages separated by form feeds
    Text,
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Html => write!(f, "HTML"),
            FormatType::Json => write!(f, "JSON"),
            FormatType::Text => write!(f, "Text"),
        }
    }
}

/// Detect input format from a file path.
///
/// The extension decides when it is one of `html`, `htm`, `json`, `txt`;
/// otherwise the content is sniffed.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let path = path.as_ref();
    if let Some(format) = detect_format_from_extension(path) {
        return Ok(format);
    }

    let file = std::fs::File::open(path)?;
    let mut buffer = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut buffer)?;
    detect_format_from_bytes(&buffer)
}

/// Detect input format from a file extension alone.
pub fn detect_format_from_extension(path: impl AsRef<Path>) -> Option<FormatType> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") | Some("xhtml") => Some(FormatType::Html),
        Some("json") => Some(FormatType::Json),
        Some("txt") | Some("text") => Some(FormatType::Text),
        _ => None,
    }
}

/// Detect input format from bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let head = &data[..data.len().min(SNIFF_LEN)];

    let first = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|pos| &head[pos..]);

    let Some(start) = first else {
        return Err(Error::InvalidData("Input is empty".into()));
    };

    // Binary content is not text of any kind
    if start.contains(&0) {
        return Err(Error::UnknownFormat);
    }

    if start.starts_with(b"{") || start.starts_with(b"[") {
        return Ok(FormatType::Json);
    }

    if start.starts_with(b"<") {
        let lower = start.to_ascii_lowercase();
        if lower.starts_with(b"<!doctype html")
            || lower.starts_with(b"<html")
            || contains(&lower, b"<body")
            || contains(&lower, b"<div")
            || contains(&lower, b"<section")
            || contains(&lower, b"<p")
        {
            return Ok(FormatType::Html);
        }
    }

    Ok(FormatType::Text)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
