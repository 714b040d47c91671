//! Data models for study sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique card identifier.
pub type CardId = Uuid;

/// Scheduling state of a card within the external SRS algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SrsState {
    /// Never reviewed.
    New,
    /// In initial learning phase.
    Learning,
    /// In regular review.
    Review,
    /// Failed review, relearning.
    Relearning,
}

impl Default for SrsState {
    fn default() -> Self {
        Self::New
    }
}

/// Scheduling metadata computed by the external SRS algorithm.
///
/// The engine never interprets these fields; they ride along with the
/// card so callers can display them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrsMeta {
    /// When the card is due for review.
    pub due: DateTime<Utc>,
    /// Memory stability estimate.
    pub stability: f64,
    /// Item difficulty estimate.
    pub difficulty: f64,
    /// Days since the last review.
    pub elapsed_days: i64,
    /// Days the current interval spans.
    pub scheduled_days: i64,
    /// Number of reviews.
    pub reps: i32,
    /// Number of lapses (failed reviews).
    pub lapses: i32,
    /// Current state.
    pub state: SrsState,
    /// When the card was last reviewed, if ever.
    pub last_review: Option<DateTime<Utc>>,
}

impl Default for SrsMeta {
    fn default() -> Self {
        Self {
            due: Utc::now(),
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: SrsState::New,
            last_review: None,
        }
    }
}

/// A flashcard as served by the due-card source.
///
/// Immutable for the duration of a session; review outcomes are
/// reported to the grade sink, never written back here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    /// Unique identifier.
    pub id: CardId,
    /// Owning collection name.
    pub collection: String,
    /// Front content.
    pub front: String,
    /// Back content.
    pub back: String,
    /// External scheduling metadata.
    pub srs: SrsMeta,
}

impl Flashcard {
    /// Create a fresh card in a collection.
    pub fn new(
        collection: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection: collection.into(),
            front: front.into(),
            back: back.into(),
            srs: SrsMeta::default(),
        }
    }
}

/// Review quality a user assigns after seeing a card's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Complete failure, needs to come back soon.
    Again,
    /// Difficult recall.
    Hard,
    /// Normal recall.
    Good,
    /// Effortless recall.
    Easy,
}

impl Grade {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Again => "Again",
            Self::Hard => "Hard",
            Self::Good => "Good",
            Self::Easy => "Easy",
        }
    }

    /// Get associated key.
    pub fn key(&self) -> char {
        match self {
            Self::Again => '1',
            Self::Hard => '2',
            Self::Good => '3',
            Self::Easy => '4',
        }
    }
}

/// One graded card in the session review log.
///
/// Also the body submitted to the grade sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    /// Card that was graded.
    pub card_id: CardId,
    /// The grade the user assigned.
    pub grade: Grade,
}

/// End-of-session statistics derived from the review log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Total cards graded this session.
    pub cards_reviewed: usize,
    /// Cards graded Again.
    pub again: usize,
    /// Cards graded Hard.
    pub hard: usize,
    /// Cards graded Good.
    pub good: usize,
    /// Cards graded Easy.
    pub easy: usize,
}

impl SessionSummary {
    /// Count grades in a single pass over the review log.
    pub fn tally(reviewed: &[ReviewEntry]) -> Self {
        let mut summary = Self::default();
        for entry in reviewed {
            summary.cards_reviewed += 1;
            match entry.grade {
                Grade::Again => summary.again += 1,
                Grade::Hard => summary.hard += 1,
                Grade::Good => summary.good += 1,
                Grade::Easy => summary.easy += 1,
            }
        }
        summary
    }

    /// Share of reviews graded Good or Easy.
    pub fn accuracy(&self) -> f64 {
        if self.cards_reviewed == 0 {
            0.0
        } else {
            (self.good + self.easy) as f64 / self.cards_reviewed as f64
        }
    }
}
