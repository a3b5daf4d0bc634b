//! Append-only history log contract and SQLite implementation.
//!
//! # Responsibility
//! - Record one immutable entry per note mutation.
//! - Replay the chronological history of a single note.
//!
//! # Invariants
//! - Entries are never updated or deleted; `seq` is the total append order.
//! - Every message embeds a freshly generated correlation identifier,
//!   distinct from both the note identifier and the entry's own commit id.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{format_timestamp, parse_timestamp, NoteId};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

/// Kind of mutation recorded by one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    /// Message verb for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// One immutable record of a note mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Entry identifier, unique within the log.
    pub commit_uuid: Uuid,
    /// Note this entry belongs to.
    pub note_uuid: NoteId,
    /// Human-readable message, correlation identifier included.
    pub message: String,
    /// Append time, UTC.
    pub created_at: DateTime<Utc>,
}

/// Append-only log interface keyed by note identifier.
pub trait HistoryLog {
    /// Appends one entry and returns the correlation identifier embedded
    /// in its message.
    ///
    /// Fails only when the underlying storage medium is unwritable.
    fn append(&self, note_id: NoteId, action: ChangeAction) -> RepoResult<Uuid>;

    /// Returns all entries for one note, oldest first.
    ///
    /// An identifier with no recorded changes yields an empty sequence,
    /// not an error.
    fn history_for(&self, note_id: NoteId) -> RepoResult<Vec<HistoryEntry>>;
}

/// SQLite-backed history log.
///
/// The connection sits behind a mutex so the log is shareable across
/// threads; appends serialize at the log itself.
pub struct SqliteHistoryLog {
    conn: Mutex<Connection>,
}

impl SqliteHistoryLog {
    /// Opens (or creates) the log database at the given path.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_db(path)?),
        })
    }

    /// Opens a process-private in-memory log.
    pub fn in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_db_in_memory()?),
        })
    }
}

impl HistoryLog for SqliteHistoryLog {
    fn append(&self, note_id: NoteId, action: ChangeAction) -> RepoResult<Uuid> {
        let correlation_uuid = Uuid::new_v4();
        let commit_uuid = Uuid::new_v4();
        let message = format!("{} {note_id} (commit {correlation_uuid})", action.as_str());

        self.conn.lock().execute(
            "INSERT INTO commits (commit_uuid, note_uuid, message, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                commit_uuid.to_string(),
                note_id.to_string(),
                message,
                format_timestamp(&Utc::now()),
            ],
        )?;

        Ok(correlation_uuid)
    }

    fn history_for(&self, note_id: NoteId) -> RepoResult<Vec<HistoryEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT commit_uuid, note_uuid, message, created_at
             FROM commits
             WHERE note_uuid = ?1
             ORDER BY seq ASC;",
        )?;

        let mut rows = stmt.query([note_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_history_row(row)?);
        }

        Ok(entries)
    }
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<HistoryEntry> {
    let commit_text: String = row.get("commit_uuid")?;
    let commit_uuid = parse_uuid_column(&commit_text, "commits.commit_uuid")?;

    let note_text: String = row.get("note_uuid")?;
    let note_uuid = parse_uuid_column(&note_text, "commits.note_uuid")?;

    let created_text: String = row.get("created_at")?;
    let created_at = parse_timestamp(&created_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_text}` in commits.created_at"
        ))
    })?;

    Ok(HistoryEntry {
        commit_uuid,
        note_uuid,
        message: row.get("message")?,
        created_at,
    })
}

fn parse_uuid_column(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
