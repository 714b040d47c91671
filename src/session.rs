//! Session state machine.
//!
//! [`SessionState`] is a pure reducer: every command applies
//! synchronously and either transitions the state or reports a
//! [`CommandError`]. Network effects live in the orchestration shell
//! ([`crate::engine::StudySession`]), which feeds load outcomes in
//! through [`SessionState::cards_loaded`] / [`SessionState::load_failed`].

use std::fmt;

use thiserror::Error;

use crate::models::{CardId, Flashcard, Grade, ReviewEntry, SessionSummary};

/// Lifecycle phase of a study session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting on the due-card fetch.
    Loading,
    /// Reviewing; a current card exists.
    Active,
    /// The fetch returned no due cards.
    Empty,
    /// The queue was exhausted or the user ended early; summary is set.
    Finished,
    /// The fetch failed; `load_error` is set.
    Errored,
}

/// Why a due-card load failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// HTTP status, when the server answered at all.
    pub status: Option<u16>,
    /// Human-readable failure reason.
    pub message: String,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

/// A command was issued against a state that does not admit it.
///
/// These are caller errors: the state is left untouched, so a
/// presentation layer may ignore them or surface them in debug builds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("no current card in phase {phase:?}")]
    NotActive { phase: Phase },
    #[error("graded card {got} but the current card is {expected}")]
    CardMismatch { expected: CardId, got: CardId },
    #[error("cannot end a session in phase {phase:?}")]
    NotEndable { phase: Phase },
    #[error("cannot restart a session in phase {phase:?}")]
    NotRestartable { phase: Phase },
}

/// The single mutable aggregate behind one study attempt.
///
/// Created fresh per attempt and discarded afterwards; durable SRS
/// updates belong to the external store, not this type.
#[derive(Debug, Clone)]
pub struct SessionState {
    collection: String,
    queue: Vec<Flashcard>,
    current_index: usize,
    front_visible: bool,
    reviewed: Vec<ReviewEntry>,
    phase: Phase,
    summary: Option<SessionSummary>,
    load_error: Option<LoadError>,
}

impl SessionState {
    /// Fresh state for one collection, waiting on the due-card fetch.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            queue: Vec::new(),
            current_index: 0,
            front_visible: true,
            reviewed: Vec::new(),
            phase: Phase::Loading,
            summary: None,
            load_error: None,
        }
    }

    /// Collection this session studies.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The session queue, fixed once loaded.
    pub fn queue(&self) -> &[Flashcard] {
        &self.queue
    }

    /// The card under review, present exactly when `Active`.
    pub fn current_card(&self) -> Option<&Flashcard> {
        if self.phase == Phase::Active {
            self.queue.get(self.current_index)
        } else {
            None
        }
    }

    /// Whether the front of the current card is showing.
    pub fn is_front_visible(&self) -> bool {
        self.front_visible
    }

    /// Cards graded so far, in grading order.
    pub fn reviewed(&self) -> &[ReviewEntry] {
        &self.reviewed
    }

    /// Session statistics, present exactly when `Finished`.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Load failure, present exactly when `Errored`.
    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    /// Zero-based position in the queue.
    pub fn position(&self) -> usize {
        self.current_index
    }

    /// Total cards in the queue.
    pub fn total(&self) -> usize {
        self.queue.len()
    }

    /// Cards not yet passed, including the current one.
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.current_index)
    }

    /// Apply a successful due-card fetch. Ignored outside `Loading`.
    pub fn cards_loaded(&mut self, cards: Vec<Flashcard>) {
        if self.phase != Phase::Loading {
            return;
        }
        self.queue = cards;
        self.current_index = 0;
        self.front_visible = true;
        self.phase = if self.queue.is_empty() {
            Phase::Empty
        } else {
            Phase::Active
        };
    }

    /// Apply a failed due-card fetch. Ignored outside `Loading`.
    pub fn load_failed(&mut self, error: LoadError) {
        if self.phase != Phase::Loading {
            return;
        }
        self.load_error = Some(error);
        self.phase = Phase::Errored;
    }

    /// Toggle which face of the current card is showing.
    pub fn flip(&mut self) -> Result<(), CommandError> {
        if self.current_card().is_none() {
            return Err(CommandError::NotActive { phase: self.phase });
        }
        self.front_visible = !self.front_visible;
        Ok(())
    }

    /// Record a grade for the current card and advance past it.
    ///
    /// The entry is appended before any remote submission happens; the
    /// log reflects what the user decided, not network outcome. Returns
    /// the entry so the shell can forward it to the grade sink.
    pub fn grade(&mut self, card_id: CardId, grade: Grade) -> Result<ReviewEntry, CommandError> {
        let current = self
            .current_card()
            .ok_or(CommandError::NotActive { phase: self.phase })?;
        if current.id != card_id {
            return Err(CommandError::CardMismatch {
                expected: current.id,
                got: card_id,
            });
        }
        let entry = ReviewEntry { card_id, grade };
        self.reviewed.push(entry);
        self.advance();
        Ok(entry)
    }

    /// Move past the current card without grading it.
    pub fn skip(&mut self) -> Result<(), CommandError> {
        if self.current_card().is_none() {
            return Err(CommandError::NotActive { phase: self.phase });
        }
        self.advance();
        Ok(())
    }

    /// End the session early, summarizing whatever was reviewed so far.
    ///
    /// Remaining cards are dropped from consideration, not re-queued.
    pub fn end(&mut self) -> Result<(), CommandError> {
        match self.phase {
            Phase::Active | Phase::Empty => {
                self.finish();
                Ok(())
            }
            phase => Err(CommandError::NotEndable { phase }),
        }
    }

    /// Reset every transient field for a fresh load of the same collection.
    pub fn retry(&mut self) -> Result<(), CommandError> {
        match self.phase {
            Phase::Errored | Phase::Finished | Phase::Empty => {
                self.queue.clear();
                self.current_index = 0;
                self.front_visible = true;
                self.reviewed.clear();
                self.summary = None;
                self.load_error = None;
                self.phase = Phase::Loading;
                Ok(())
            }
            phase => Err(CommandError::NotRestartable { phase }),
        }
    }

    fn advance(&mut self) {
        self.current_index += 1;
        self.front_visible = true;
        if self.current_index == self.queue.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.summary = Some(SessionSummary::tally(&self.reviewed));
        self.phase = Phase::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Flashcard;

    fn three_cards() -> Vec<Flashcard> {
        vec![
            Flashcard::new("Spanish", "hola", "hello"),
            Flashcard::new("Spanish", "adios", "goodbye"),
            Flashcard::new("Spanish", "gato", "cat"),
        ]
    }

    fn active_session(cards: Vec<Flashcard>) -> SessionState {
        let mut state = SessionState::new("Spanish");
        state.cards_loaded(cards);
        state
    }

    #[test]
    fn test_load_enters_active() {
        let cards = three_cards();
        let first = cards[0].id;
        let state = active_session(cards);

        assert_eq!(state.phase(), Phase::Active);
        assert_eq!(state.position(), 0);
        assert!(state.is_front_visible());
        assert_eq!(state.current_card().map(|c| c.id), Some(first));
        assert_eq!(state.remaining(), 3);
    }

    #[test]
    fn test_load_empty_queue() {
        let state = active_session(Vec::new());
        assert_eq!(state.phase(), Phase::Empty);
        assert!(state.current_card().is_none());
    }

    #[test]
    fn test_load_failure() {
        let mut state = SessionState::new("Spanish");
        state.load_failed(LoadError {
            status: Some(502),
            message: "bad gateway".into(),
        });

        assert_eq!(state.phase(), Phase::Errored);
        let error = state.load_error().unwrap();
        assert_eq!(error.status, Some(502));
        assert_eq!(error.to_string(), "bad gateway (502)");
    }

    #[test]
    fn test_flip() {
        let mut state = active_session(three_cards());
        let card = state.current_card().map(|c| c.id);

        state.flip().unwrap();
        assert!(!state.is_front_visible());
        assert_eq!(state.current_card().map(|c| c.id), card);
        assert_eq!(state.position(), 0);

        state.flip().unwrap();
        assert!(state.is_front_visible());
    }

    #[test]
    fn test_grade_advances() {
        let mut state = active_session(three_cards());
        let first = state.current_card().unwrap().id;

        state.flip().unwrap();
        let entry = state.grade(first, Grade::Good).unwrap();

        assert_eq!(entry.card_id, first);
        assert_eq!(state.reviewed(), &[entry]);
        assert_eq!(state.position(), 1);
        assert!(state.is_front_visible());
        assert_eq!(state.phase(), Phase::Active);
    }

    #[test]
    fn test_full_session_summary() {
        let mut state = active_session(three_cards());

        for grade in [Grade::Good, Grade::Again, Grade::Easy] {
            let id = state.current_card().unwrap().id;
            state.grade(id, grade).unwrap();
        }

        assert_eq!(state.phase(), Phase::Finished);
        assert!(state.current_card().is_none());
        let summary = state.summary().unwrap();
        assert_eq!(summary.cards_reviewed, 3);
        assert_eq!(summary.again, 1);
        assert_eq!(summary.hard, 0);
        assert_eq!(summary.good, 1);
        assert_eq!(summary.easy, 1);
    }

    #[test]
    fn test_grade_mismatched_card() {
        let mut state = active_session(three_cards());
        let current = state.current_card().unwrap().id;
        let stale = uuid::Uuid::new_v4();

        let err = state.grade(stale, Grade::Good).unwrap_err();
        assert_eq!(
            err,
            CommandError::CardMismatch {
                expected: current,
                got: stale
            }
        );
        assert!(state.reviewed().is_empty());
        assert_eq!(state.position(), 0);
    }

    #[test]
    fn test_commands_outside_active() {
        let mut loading = SessionState::new("Spanish");
        assert_eq!(
            loading.flip().unwrap_err(),
            CommandError::NotActive { phase: Phase::Loading }
        );
        assert_eq!(
            loading.skip().unwrap_err(),
            CommandError::NotActive { phase: Phase::Loading }
        );
        assert_eq!(
            loading.end().unwrap_err(),
            CommandError::NotEndable { phase: Phase::Loading }
        );

        let mut finished = active_session(three_cards());
        finished.end().unwrap();
        assert_eq!(
            finished.flip().unwrap_err(),
            CommandError::NotActive { phase: Phase::Finished }
        );
        assert_eq!(
            finished.end().unwrap_err(),
            CommandError::NotEndable { phase: Phase::Finished }
        );
    }

    #[test]
    fn test_skip() {
        let mut state = active_session(three_cards());
        state.skip().unwrap();

        assert!(state.reviewed().is_empty());
        assert_eq!(state.position(), 1);
        assert_eq!(state.phase(), Phase::Active);
    }

    #[test]
    fn test_end_session_partial() {
        let mut state = active_session(three_cards());
        let first = state.current_card().unwrap().id;
        state.grade(first, Grade::Hard).unwrap();

        state.end().unwrap();

        assert_eq!(state.phase(), Phase::Finished);
        let summary = state.summary().unwrap();
        assert_eq!(summary.cards_reviewed, 1);
        assert_eq!(summary.hard, 1);
    }

    #[test]
    fn test_end_session_empty() {
        let mut state = active_session(Vec::new());
        state.end().unwrap();

        assert_eq!(state.phase(), Phase::Finished);
        let summary = state.summary().unwrap();
        assert_eq!(summary.cards_reviewed, 0);
        assert_eq!(
            summary.again + summary.hard + summary.good + summary.easy,
            0
        );
    }

    #[test]
    fn test_retry_resets_state() {
        let mut state = active_session(three_cards());
        let first = state.current_card().unwrap().id;
        state.grade(first, Grade::Good).unwrap();
        state.end().unwrap();

        state.retry().unwrap();

        assert_eq!(state.phase(), Phase::Loading);
        assert_eq!(state.collection(), "Spanish");
        assert!(state.reviewed().is_empty());
        assert!(state.summary().is_none());
        assert!(state.load_error().is_none());
        assert_eq!(state.position(), 0);
        assert_eq!(state.total(), 0);
    }

    #[test]
    fn test_retry_mid_session() {
        let mut state = active_session(three_cards());
        assert_eq!(
            state.retry().unwrap_err(),
            CommandError::NotRestartable { phase: Phase::Active }
        );
    }

    #[test]
    fn test_late_load_outcome_ignored() {
        let mut state = active_session(three_cards());
        let total = state.total();

        // Settled sessions never accept another load outcome.
        state.cards_loaded(Vec::new());
        state.load_failed(LoadError { status: None, message: "late".into() });

        assert_eq!(state.phase(), Phase::Active);
        assert_eq!(state.total(), total);
        assert!(state.load_error().is_none());
    }

    #[test]
    fn test_queue_immutable() {
        let cards = three_cards();
        let ids: Vec<_> = cards.iter().map(|c| c.id).collect();
        let mut state = active_session(cards);

        state.flip().unwrap();
        state.grade(ids[0], Grade::Good).unwrap();
        state.skip().unwrap();
        state.grade(ids[2], Grade::Again).unwrap();

        let after: Vec<_> = state.queue().iter().map(|c| c.id).collect();
        assert_eq!(after, ids);
    }
}
