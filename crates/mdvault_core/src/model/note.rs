//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its lifecycle helpers.
//! - Own the canonical timestamp text format shared by header and history.
//!
//! # Invariants
//! - `uuid` is assigned once at creation and never reused for another note.
//! - `updated_at` is refreshed on every full-content replacement.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every note in the vault.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Canonical domain record for one versioned note.
///
/// Tags are an unordered set of free-form strings; duplicates are allowed
/// and preserved in the order the caller supplied them so the formatted
/// header stays byte-identical for identical input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID used for file naming and history keying.
    pub uuid: NoteId,
    /// Raw markdown body, stored below the metadata header.
    pub content: String,
    /// Free-form tags, comma-joined in the persisted header.
    pub tags: Vec<String>,
    /// Optional author attribution.
    pub author: Option<String>,
    /// Last modification time, UTC.
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new note with a generated stable ID and a fresh timestamp.
    pub fn new(content: impl Into<String>, tags: Vec<String>, author: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4(), content, tags, author)
    }

    /// Creates a note with a caller-provided stable ID and a fresh timestamp.
    ///
    /// Used by the update path where identity is already fixed.
    pub fn with_id(
        uuid: NoteId,
        content: impl Into<String>,
        tags: Vec<String>,
        author: Option<String>,
    ) -> Self {
        Self {
            uuid,
            content: content.into(),
            tags,
            author,
            updated_at: Utc::now(),
        }
    }

    /// Refreshes the last-modified timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Renders a timestamp in the canonical vault form (RFC 3339, UTC, `Z`).
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a timestamp previously rendered by [`format_timestamp`].
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_timestamp, Note};

    #[test]
    fn new_note_assigns_distinct_ids() {
        let first = Note::new("a", Vec::new(), None);
        let second = Note::new("a", Vec::new(), None);
        assert_ne!(first.uuid, second.uuid);
    }

    #[test]
    fn touch_never_moves_timestamp_backwards() {
        let mut note = Note::new("body", Vec::new(), None);
        let before = note.updated_at;
        note.touch();
        assert!(note.updated_at >= before);
    }

    #[test]
    fn timestamp_roundtrip_is_stable_at_micros_precision() {
        let note = Note::new("body", Vec::new(), None);
        let rendered = format_timestamp(&note.updated_at);
        let parsed = parse_timestamp(&rendered).expect("rendered timestamp should parse");
        assert_eq!(format_timestamp(&parsed), rendered);
    }

    #[test]
    fn parse_timestamp_rejects_non_rfc3339_text() {
        assert!(parse_timestamp("unknown").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
