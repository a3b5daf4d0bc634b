//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, history log and query engine into use-case APIs.
//! - Keep outer layers decoupled from storage details.

pub mod note_service;
