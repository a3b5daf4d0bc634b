//! Metadata header codec.
//!
//! # Responsibility
//! - Render the delimiter-bounded `key: value` header for a note.
//! - Parse persisted header blocks back into a metadata mapping.
//!
//! # Invariants
//! - Field order is fixed: `note_uuid`, `last_updated`, `tags`, `author`.
//! - Formatting is deterministic: identical input yields identical bytes.
//! - Content with no leading marker parses to an empty mapping instead of
//!   an error, so legacy or foreign files stay readable.

use crate::model::note::{format_timestamp, Note};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Line that opens and closes the metadata header block.
pub const HEADER_MARKER: &str = "---";

/// Header key holding the note identifier.
pub const KEY_NOTE_UUID: &str = "note_uuid";
/// Header key holding the last-modified timestamp.
pub const KEY_LAST_UPDATED: &str = "last_updated";
/// Header key holding the comma-joined tag list.
pub const KEY_TAGS: &str = "tags";
/// Header key holding the author attribution.
pub const KEY_AUTHOR: &str = "author";

/// Sentinel written to the `tags` field when a note has no tags.
pub const TAGS_NONE_SENTINEL: &str = "none";
/// Sentinel for absent author and for unreadable metadata fields.
pub const UNKNOWN_SENTINEL: &str = "unknown";

static HEADER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:]+):[ \t]*(.*)$").expect("valid header line regex"));

/// Parsed header fields, keyed by header key.
pub type HeaderMap = BTreeMap<String, String>;

/// Codec error for persisted header blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// A line inside the header block carries no colon separator.
    ///
    /// Recoverable: callers fall back to treating the whole file as
    /// unparsed content with sentinel metadata.
    MalformedLine(String),
}

impl Display for HeaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine(line) => write!(f, "malformed header line: `{line}`"),
        }
    }
}

impl Error for HeaderError {}

/// Renders the full persisted form of a note: header, blank separator, body.
///
/// Empty tag sets render the literal `none` sentinel; an absent author
/// renders `unknown`. Tag order is preserved as supplied.
pub fn format_note(note: &Note) -> String {
    let tags = if note.tags.is_empty() {
        TAGS_NONE_SENTINEL.to_string()
    } else {
        note.tags.join(", ")
    };
    let author = note.author.as_deref().unwrap_or(UNKNOWN_SENTINEL);

    format!(
        "{HEADER_MARKER}\n\
         {KEY_NOTE_UUID}: {uuid}\n\
         {KEY_LAST_UPDATED}: {updated}\n\
         {KEY_TAGS}: {tags}\n\
         {KEY_AUTHOR}: {author}\n\
         {HEADER_MARKER}\n\
         \n\
         {content}",
        uuid = note.uuid,
        updated = format_timestamp(&note.updated_at),
        content = note.content,
    )
}

/// Parses the header block at the top of persisted note text.
///
/// Returns an empty mapping when the first line is not the marker. Each
/// header line is split on its first colon; keys and values are trimmed.
///
/// # Errors
/// - [`HeaderError::MalformedLine`] when a line inside the block lacks a
///   colon separator.
pub fn parse_header(text: &str) -> Result<HeaderMap, HeaderError> {
    let mut lines = text.lines();
    if lines.next() != Some(HEADER_MARKER) {
        return Ok(HeaderMap::new());
    }

    let mut fields = HeaderMap::new();
    for line in lines {
        if line == HEADER_MARKER {
            break;
        }
        let captures = HEADER_LINE_RE
            .captures(line)
            .ok_or_else(|| HeaderError::MalformedLine(line.to_string()))?;
        fields.insert(
            captures[1].trim().to_string(),
            captures[2].trim().to_string(),
        );
    }

    Ok(fields)
}

/// Returns the raw content below the header block.
///
/// Text without a leading header is returned whole; the single blank
/// separator line after the closing marker is consumed.
pub fn note_body(text: &str) -> &str {
    let Some(after_open) = text.strip_prefix(HEADER_MARKER) else {
        return text;
    };
    let Some(header) = after_open.strip_prefix('\n') else {
        return text;
    };

    let close = format!("\n{HEADER_MARKER}\n");
    let Some(close_at) = header.find(&close) else {
        return text;
    };

    let body = &header[close_at + close.len()..];
    body.strip_prefix('\n').unwrap_or(body)
}
