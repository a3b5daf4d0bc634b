//! Linear-scan search implementation.
//!
//! # Responsibility
//! - Filter the current notes by keyword, tag and author.
//! - Return full records with sentinel-degraded metadata.
//!
//! # Invariants
//! - A note is included only when every supplied, non-empty filter matches.
//! - No relevance ranking; results follow enumeration order.
//! - Unparsable headers never abort a scan.

use crate::model::header::{parse_header, HeaderMap, KEY_AUTHOR, KEY_TAGS, TAGS_NONE_SENTINEL};
use crate::repo::note_repo::{summarize, NoteRepository};
use crate::repo::{RepoError, RepoResult};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error.
#[derive(Debug)]
pub enum SearchError {
    /// Scan failed while enumerating or reading the note store.
    Repo(RepoError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Optional filters for a note scan.
///
/// Blank or whitespace-only filter values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Case-insensitive substring of the full formatted text.
    pub keyword: Option<String>,
    /// Substring of the raw comma-joined tags field.
    pub tag: Option<String>,
    /// Exact match against the parsed author field.
    pub author: Option<String>,
}

/// Single match returned by [`search_notes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Identifier as recorded in the header, or `unknown`.
    pub note_uuid: String,
    /// Full formatted text, header included.
    pub content: String,
    /// Last-modified timestamp as recorded in the header, or `unknown`.
    pub last_updated: String,
    /// Raw tags field, or `unknown`.
    pub tags: String,
    /// Author field, or `unknown`.
    pub author: String,
}

/// Scans every persisted note and returns those matching all filters.
///
/// Supplying no filters returns every note. Notes deleted mid-scan are
/// skipped rather than surfaced as errors.
pub fn search_notes<R: NoteRepository>(
    repo: &R,
    query: &SearchQuery,
) -> SearchResult<Vec<SearchHit>> {
    let mut hits = Vec::new();
    for id in repo.enumerate_ids()? {
        let text = match repo.read_note(id) {
            Ok(text) => text,
            Err(RepoError::NotFound(_)) => continue,
            Err(err) => return Err(err.into()),
        };
        let fields = parse_header(&text).unwrap_or_default();
        if matches_filters(query, &text, &fields) {
            let summary = summarize(&text);
            hits.push(SearchHit {
                note_uuid: summary.note_uuid,
                content: text,
                last_updated: summary.last_updated,
                tags: summary.tags,
                author: summary.author,
            });
        }
    }
    Ok(hits)
}

fn matches_filters(query: &SearchQuery, text: &str, fields: &HeaderMap) -> bool {
    if let Some(keyword) = active_filter(&query.keyword) {
        if !text.to_lowercase().contains(&keyword.to_lowercase()) {
            return false;
        }
    }

    if let Some(tag) = active_filter(&query.tag) {
        let tags_field = fields.get(KEY_TAGS).map(String::as_str).unwrap_or("");
        // The `none` sentinel must not satisfy a tag filter by substring.
        if tags_field == TAGS_NONE_SENTINEL || !tags_field.contains(tag) {
            return false;
        }
    }

    if let Some(author) = active_filter(&query.author) {
        if fields.get(KEY_AUTHOR).map(String::as_str) != Some(author) {
            return false;
        }
    }

    true
}

fn active_filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{matches_filters, SearchQuery};
    use crate::model::header::HeaderMap;

    fn fields(tags: &str, author: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert("tags".to_string(), tags.to_string());
        map.insert("author".to_string(), author.to_string());
        map
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = SearchQuery::default();
        assert!(matches_filters(&query, "any text", &HeaderMap::new()));
    }

    #[test]
    fn keyword_filter_is_case_insensitive() {
        let query = SearchQuery {
            keyword: Some("RUST".to_string()),
            ..SearchQuery::default()
        };
        assert!(matches_filters(&query, "about rust things", &HeaderMap::new()));
        assert!(!matches_filters(&query, "about go things", &HeaderMap::new()));
    }

    #[test]
    fn tag_sentinel_never_matches_a_tag_filter() {
        let query = SearchQuery {
            tag: Some("n".to_string()),
            ..SearchQuery::default()
        };
        assert!(!matches_filters(&query, "text", &fields("none", "ada")));
        assert!(matches_filters(&query, "text", &fields("garden", "ada")));
    }

    #[test]
    fn author_filter_requires_exact_match() {
        let query = SearchQuery {
            author: Some("ada".to_string()),
            ..SearchQuery::default()
        };
        assert!(matches_filters(&query, "text", &fields("none", "ada")));
        assert!(!matches_filters(&query, "text", &fields("none", "adam")));
    }

    #[test]
    fn blank_filter_values_are_ignored() {
        let query = SearchQuery {
            keyword: Some("  ".to_string()),
            tag: Some(String::new()),
            author: None,
        };
        assert!(matches_filters(&query, "text", &HeaderMap::new()));
    }
}
