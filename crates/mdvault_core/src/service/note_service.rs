//! Note use-case service.
//!
//! # Responsibility
//! - Provide add/get/update/delete/list/search/history entry points.
//! - Serialize mutations per note identifier across store and log.
//! - Decide externally visible error semantics for component failures.
//!
//! # Invariants
//! - A mutation holds its note's lock for the whole format -> persist ->
//!   append-history sequence; reads proceed unlocked.
//! - Every committed mutation has exactly one history entry.
//! - Update uses full content replacement semantics.

use crate::model::note::{Note, NoteId};
use crate::repo::history_repo::{ChangeAction, HistoryEntry, HistoryLog};
use crate::repo::note_repo::{NoteRepository, NoteSummary};
use crate::repo::RepoError;
use crate::search::scan::{search_notes, SearchError, SearchHit, SearchQuery};
use chrono::{DateTime, Utc};
use log::{error, info};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Creation collided with an existing identifier. Fatal: identifiers
    /// are random and a collision is not expected in practice.
    DuplicateNote(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Query-layer failure.
    Search(SearchError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateNote(id) => write!(f, "note identifier collision: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Search(err) => Some(err),
            Self::NoteNotFound(_) | Self::DuplicateNote(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::AlreadyExists(id) => Self::DuplicateNote(id),
            other => Self::Repo(other),
        }
    }
}

impl From<SearchError> for NoteServiceError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

/// Result envelope for committed create/update mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    /// Stable note identifier.
    pub note_uuid: NoteId,
    /// Correlation identifier of the appended history entry.
    pub commit_uuid: Uuid,
    /// Timestamp written into the note header.
    pub last_updated: DateTime<Utc>,
}

/// One lock per note identifier, created on first use.
///
/// Lock entries are tiny and never evicted; the table grows with the set
/// of identifiers mutated over the process lifetime.
struct NoteLocks {
    inner: Mutex<HashMap<NoteId, Arc<Mutex<()>>>>,
}

impl NoteLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn handle(&self, id: NoteId) -> Arc<Mutex<()>> {
        self.inner
            .lock()
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Note service facade over the store, history log and query engine.
pub struct NoteService<R: NoteRepository, L: HistoryLog> {
    repo: R,
    history: L,
    locks: NoteLocks,
}

impl<R: NoteRepository, L: HistoryLog> NoteService<R, L> {
    /// Creates a service over the provided store and history log.
    pub fn new(repo: R, history: L) -> Self {
        Self {
            repo,
            history,
            locks: NoteLocks::new(),
        }
    }

    /// Creates one note and appends its first history entry.
    pub fn add(
        &self,
        content: impl Into<String>,
        tags: Vec<String>,
        author: Option<String>,
    ) -> Result<CommitReceipt, NoteServiceError> {
        let started_at = Instant::now();
        let note = Note::new(content, tags, author);

        let handle = self.locks.handle(note.uuid);
        let _guard = handle.lock();
        let result = (|| {
            self.repo.create_note(&note)?;
            self.history.append(note.uuid, ChangeAction::Create)
        })()
        .map(|commit_uuid| receipt(&note, commit_uuid))
        .map_err(NoteServiceError::from);
        log_mutation("note_create", note.uuid, &result, started_at);
        result
    }

    /// Returns the full formatted text of one note.
    pub fn get(&self, id: NoteId) -> Result<String, NoteServiceError> {
        Ok(self.repo.read_note(id)?)
    }

    /// Replaces one note's content and metadata wholesale.
    pub fn update(
        &self,
        id: NoteId,
        content: impl Into<String>,
        tags: Vec<String>,
        author: Option<String>,
    ) -> Result<CommitReceipt, NoteServiceError> {
        let started_at = Instant::now();

        let handle = self.locks.handle(id);
        let _guard = handle.lock();
        let note = Note::with_id(id, content, tags, author);
        let result = (|| {
            self.repo.replace_note(&note)?;
            self.history.append(id, ChangeAction::Update)
        })()
        .map(|commit_uuid| receipt(&note, commit_uuid))
        .map_err(NoteServiceError::from);
        log_mutation("note_update", id, &result, started_at);
        result
    }

    /// Removes one note and appends its terminal history entry.
    ///
    /// Returns the correlation identifier of the `delete` entry.
    pub fn delete(&self, id: NoteId) -> Result<Uuid, NoteServiceError> {
        let started_at = Instant::now();

        let handle = self.locks.handle(id);
        let _guard = handle.lock();
        let result = (|| {
            self.repo.delete_note(id)?;
            self.history.append(id, ChangeAction::Delete)
        })()
        .map_err(NoteServiceError::from);

        match &result {
            Ok(commit_uuid) => info!(
                "event=note_delete module=service status=ok note_uuid={id} commit_uuid={commit_uuid} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=note_delete module=service status=error note_uuid={id} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    /// Summarizes every persisted note.
    pub fn list(&self) -> Result<Vec<NoteSummary>, NoteServiceError> {
        Ok(self.repo.list_notes()?)
    }

    /// Scans the store with the supplied filters.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, NoteServiceError> {
        Ok(search_notes(&self.repo, query)?)
    }

    /// Returns one note's history, oldest first.
    ///
    /// An identifier with no recorded changes yields an empty sequence.
    pub fn history(&self, id: NoteId) -> Result<Vec<HistoryEntry>, NoteServiceError> {
        Ok(self.history.history_for(id)?)
    }
}

fn receipt(note: &Note, commit_uuid: Uuid) -> CommitReceipt {
    CommitReceipt {
        note_uuid: note.uuid,
        commit_uuid,
        last_updated: note.updated_at,
    }
}

fn log_mutation(
    event: &str,
    id: NoteId,
    result: &Result<CommitReceipt, NoteServiceError>,
    started_at: Instant,
) {
    match result {
        Ok(receipt) => info!(
            "event={event} module=service status=ok note_uuid={id} commit_uuid={} duration_ms={}",
            receipt.commit_uuid,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=service status=error note_uuid={id} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
}
