//! Orchestration shell around [`SessionState`].
//!
//! Performs the one asynchronous load per session (guarded against
//! stale responses) and the per-card grade submission. Submissions are
//! detached tasks: the session advances locally whether or not the
//! sink ever acknowledges, so a slow or failing backend never stalls
//! navigation through the deck.

use std::sync::Arc;

use crate::config::Config;
use crate::models::{CardId, Flashcard, Grade};
use crate::session::{CommandError, Phase, SessionState};
use crate::source::{CardSource, HttpCardSource, SourceError};

/// Identifies one issued load; completions carrying a stale token are
/// discarded so a slow earlier request cannot overwrite a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// A study session over one collection's due cards.
pub struct StudySession {
    state: SessionState,
    source: Arc<dyn CardSource>,
    review_limit: Option<usize>,
    load_seq: u64,
}

impl StudySession {
    /// New session for a collection. Call [`StudySession::load`] to
    /// fetch the queue.
    pub fn new(collection: impl Into<String>, source: Arc<dyn CardSource>) -> Self {
        Self {
            state: SessionState::new(collection),
            source,
            review_limit: None,
            load_seq: 0,
        }
    }

    /// Session against the configured HTTP backend.
    pub fn from_config(
        collection: impl Into<String>,
        config: &Config,
    ) -> Result<Self, SourceError> {
        let source = Arc::new(HttpCardSource::new(&config.server)?);
        let session = Self::new(collection, source);
        Ok(match config.study.review_limit {
            Some(limit) => session.with_review_limit(limit),
            None => session,
        })
    }

    /// Cap the number of cards taken into the session queue.
    pub fn with_review_limit(mut self, limit: usize) -> Self {
        self.review_limit = Some(limit);
        self
    }

    /// Read access for the presentation layer.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Reset to `Loading` and invalidate any outstanding fetch.
    ///
    /// Callers that drive the fetch themselves pair this with
    /// [`StudySession::complete_load`]; [`StudySession::load`] composes
    /// the two.
    pub fn begin_load(&mut self) -> LoadToken {
        self.load_seq += 1;
        self.state = SessionState::new(self.state.collection().to_string());
        LoadToken(self.load_seq)
    }

    /// Apply a finished fetch if it is still the latest one issued.
    pub fn complete_load(
        &mut self,
        token: LoadToken,
        result: Result<Vec<Flashcard>, SourceError>,
    ) {
        if token.0 != self.load_seq {
            tracing::debug!(
                collection = self.state.collection(),
                "Discarding stale due card response"
            );
            return;
        }
        match result {
            Ok(mut cards) => {
                if let Some(limit) = self.review_limit {
                    cards.truncate(limit);
                }
                tracing::info!(
                    collection = self.state.collection(),
                    cards = cards.len(),
                    "Loaded due cards"
                );
                self.state.cards_loaded(cards);
            }
            Err(e) => {
                tracing::warn!(
                    collection = self.state.collection(),
                    error = %e,
                    "Failed to load due cards"
                );
                self.state.load_failed((&e).into());
            }
        }
    }

    /// Fetch the due cards and enter `Active`, `Empty`, or `Errored`.
    pub async fn load(&mut self) {
        let token = self.begin_load();
        let result = self.source.due_cards(self.state.collection()).await;
        self.complete_load(token, result);
    }

    /// Restart from `Errored`, `Finished`, or `Empty`: reset and reload
    /// the same collection.
    pub async fn retry(&mut self) -> Result<(), CommandError> {
        self.state.retry()?;
        self.load().await;
        Ok(())
    }

    /// Toggle the visible face of the current card.
    pub fn flip(&mut self) -> Result<(), CommandError> {
        self.state.flip()
    }

    /// Grade the current card and advance past it.
    ///
    /// The review is recorded and the queue advances before the sink is
    /// contacted; the submission runs as a detached task whose failure
    /// is logged, never propagated. Must be called within a Tokio
    /// runtime.
    pub fn grade(&mut self, card_id: CardId, grade: Grade) -> Result<(), CommandError> {
        let entry = self.state.grade(card_id, grade)?;
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            if let Err(e) = source.submit_grade(&entry).await {
                tracing::warn!(card_id = %entry.card_id, error = %e, "Failed to submit grade");
            }
        });
        Ok(())
    }

    /// Move past the current card without grading it.
    pub fn skip(&mut self) -> Result<(), CommandError> {
        self.state.skip()
    }

    /// End the session early, summarizing progress so far.
    pub fn end_session(&mut self) -> Result<(), CommandError> {
        self.state.end()
    }

    /// Whether the session has settled in a phase that admits no
    /// further reviewing without a restart.
    pub fn is_over(&self) -> bool {
        matches!(self.state.phase(), Phase::Finished | Phase::Errored | Phase::Empty)
    }
}
