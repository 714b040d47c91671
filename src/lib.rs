//! Spaced-repetition study session engine.
//!
//! This crate drives one review session over a queue of due flashcards:
//! - Session state machine with loading, active, empty, finished, and
//!   errored phases ([`SessionState`])
//! - Card flip and four-level grading over a fixed queue
//! - Append-only review log with end-of-session summary statistics
//! - Async shell with stale-load protection and fire-and-forget grade
//!   submission ([`StudySession`])
//!
//! Scheduling itself is the backend's job; a failing grade write is
//! logged rather than allowed to stall the deck.

pub mod config;
pub mod engine;
pub mod models;
pub mod session;
pub mod source;

pub use config::Config;
pub use engine::{LoadToken, StudySession};
pub use models::{CardId, Flashcard, Grade, ReviewEntry, SessionSummary, SrsMeta, SrsState};
pub use session::{CommandError, LoadError, Phase, SessionState};
pub use source::{CardSource, HttpCardSource, SourceError};
