//! Core domain logic for mdvault.
//! This crate is the single source of truth for note-store invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::header::{format_note, note_body, parse_header, HeaderError, HeaderMap};
pub use model::note::{Note, NoteId};
pub use repo::history_repo::{ChangeAction, HistoryEntry, HistoryLog, SqliteHistoryLog};
pub use repo::note_repo::{FsNoteRepository, NoteRepository, NoteSummary};
pub use repo::{RepoError, RepoResult};
pub use search::scan::{search_notes, SearchError, SearchHit, SearchQuery, SearchResult};
pub use service::note_service::{CommitReceipt, NoteService, NoteServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
