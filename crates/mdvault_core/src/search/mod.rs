//! Query entry points for the note store.
//!
//! # Responsibility
//! - Expose linear-scan filtering over the current set of notes.
//! - Keep search result shaping inside core.

pub mod scan;
