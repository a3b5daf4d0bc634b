//! Note store contract and filesystem implementation.
//!
//! # Responsibility
//! - Persist one file per note, named solely by its identifier.
//! - Render notes through the header codec on every write.
//! - Enumerate and summarize the current set of persisted notes.
//!
//! # Invariants
//! - Writes are atomic: content lands in a sibling temporary file and is
//!   renamed into place, so readers never observe partial documents.
//! - Listing never fails on an unparsable header; affected fields degrade
//!   to the `unknown` sentinel.

use crate::model::header::{
    format_note, parse_header, HeaderMap, KEY_AUTHOR, KEY_LAST_UPDATED, KEY_NOTE_UUID, KEY_TAGS,
    UNKNOWN_SENTINEL,
};
use crate::model::note::{Note, NoteId};
use crate::repo::{RepoError, RepoResult};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use uuid::Uuid;

const NOTE_FILE_EXTENSION: &str = "md";

/// Read model for note listings.
///
/// Fields are plain strings because a listing must surface sentinel values
/// for unparsable headers instead of failing the whole enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSummary {
    /// Identifier as recorded in the header, or `unknown`.
    pub note_uuid: String,
    /// Last-modified timestamp as recorded in the header, or `unknown`.
    pub last_updated: String,
    /// Raw comma-joined tags field, or `unknown`.
    pub tags: String,
    /// Author field, or `unknown`.
    pub author: String,
}

/// Store interface for note persistence.
pub trait NoteRepository {
    /// Persists a brand-new note; the file must not exist yet.
    fn create_note(&self, note: &Note) -> RepoResult<()>;
    /// Returns the full formatted text (header and body) of one note.
    fn read_note(&self, id: NoteId) -> RepoResult<String>;
    /// Overwrites an existing note wholesale; fails when absent.
    fn replace_note(&self, note: &Note) -> RepoResult<()>;
    /// Removes one note file; fails when absent.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    /// Summarizes every persisted note in enumeration order.
    fn list_notes(&self) -> RepoResult<Vec<NoteSummary>>;
    /// Lazily enumerates the identifiers of all persisted notes.
    ///
    /// The sequence is finite and non-restartable; enumeration order is
    /// directory order and not guaranteed stable across calls.
    fn enumerate_ids(&self) -> RepoResult<Box<dyn Iterator<Item = NoteId>>>;
}

/// Filesystem-backed note store rooted at a dedicated notes directory.
pub struct FsNoteRepository {
    notes_dir: PathBuf,
}

impl FsNoteRepository {
    /// Opens the store, creating the notes directory when missing.
    pub fn open(notes_dir: impl Into<PathBuf>) -> RepoResult<Self> {
        let notes_dir = notes_dir.into();
        fs::create_dir_all(&notes_dir)?;
        Ok(Self { notes_dir })
    }

    fn note_path(&self, id: NoteId) -> PathBuf {
        self.notes_dir.join(format!("{id}.{NOTE_FILE_EXTENSION}"))
    }

    fn write_atomic(&self, id: NoteId, text: &str) -> RepoResult<()> {
        let target = self.note_path(id);
        let staging = self.notes_dir.join(format!(".{id}.tmp"));
        fs::write(&staging, text)?;
        if let Err(err) = fs::rename(&staging, &target) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }
}

impl NoteRepository for FsNoteRepository {
    fn create_note(&self, note: &Note) -> RepoResult<()> {
        if self.note_path(note.uuid).exists() {
            return Err(RepoError::AlreadyExists(note.uuid));
        }
        self.write_atomic(note.uuid, &format_note(note))
    }

    fn read_note(&self, id: NoteId) -> RepoResult<String> {
        match fs::read_to_string(self.note_path(id)) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(RepoError::NotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    fn replace_note(&self, note: &Note) -> RepoResult<()> {
        if !self.note_path(note.uuid).exists() {
            return Err(RepoError::NotFound(note.uuid));
        }
        self.write_atomic(note.uuid, &format_note(note))
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        match fs::remove_file(self.note_path(id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(RepoError::NotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    fn list_notes(&self) -> RepoResult<Vec<NoteSummary>> {
        let mut summaries = Vec::new();
        for id in self.enumerate_ids()? {
            let text = match self.read_note(id) {
                Ok(text) => text,
                // Deleted between enumeration and read.
                Err(RepoError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            };
            summaries.push(summarize(&text));
        }
        Ok(summaries)
    }

    fn enumerate_ids(&self) -> RepoResult<Box<dyn Iterator<Item = NoteId>>> {
        let entries = fs::read_dir(&self.notes_dir)?;
        Ok(Box::new(entries.filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(NOTE_FILE_EXTENSION) {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            Uuid::parse_str(stem).ok()
        })))
    }
}

/// Builds a listing summary from persisted note text.
///
/// Headers that fail to parse yield a summary of `unknown` sentinels.
pub fn summarize(text: &str) -> NoteSummary {
    let fields = parse_header(text).unwrap_or_default();
    NoteSummary {
        note_uuid: field_or_unknown(&fields, KEY_NOTE_UUID),
        last_updated: field_or_unknown(&fields, KEY_LAST_UPDATED),
        tags: field_or_unknown(&fields, KEY_TAGS),
        author: field_or_unknown(&fields, KEY_AUTHOR),
    }
}

fn field_or_unknown(fields: &HeaderMap, key: &str) -> String {
    fields
        .get(key)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_SENTINEL.to_string())
}
