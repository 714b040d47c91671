//! External collaborators: the due-card source and the grade sink.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::models::{Flashcard, ReviewEntry};
use crate::session::LoadError;

/// Failure talking to the backing store.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },
    /// The request never produced a server answer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SourceError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

impl From<&SourceError> for LoadError {
    fn from(err: &SourceError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// Supplies due cards for a collection and accepts grade submissions.
///
/// The due-card ordering is computed by the server and is the session
/// order. Each grade is submitted exactly once per review-log entry;
/// whether duplicate deliveries are deduplicated is the server's
/// policy, not the engine's.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Ordered list of cards due now for `collection`.
    async fn due_cards(&self, collection: &str) -> Result<Vec<Flashcard>, SourceError>;

    /// Report one review outcome so the card can be rescheduled.
    async fn submit_grade(&self, review: &ReviewEntry) -> Result<(), SourceError>;
}

/// REST client for the hosted flashcard backend.
pub struct HttpCardSource {
    client: Client,
    base_url: String,
}

impl HttpCardSource {
    /// Build a client against the configured backend.
    pub fn new(config: &ServerConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn due_url(&self, collection: &str) -> String {
        format!(
            "{}/api/collections/{}/due",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    fn reviews_url(&self) -> String {
        format!("{}/api/reviews", self.base_url)
    }
}

#[async_trait]
impl CardSource for HttpCardSource {
    async fn due_cards(&self, collection: &str) -> Result<Vec<Flashcard>, SourceError> {
        let response = self.client.get(self.due_url(collection)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    async fn submit_grade(&self, review: &ReviewEntry) -> Result<(), SourceError> {
        let response = self
            .client
            .post(self.reviews_url())
            .json(review)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api { status, message });
        }

        Ok(())
    }
}

mod urlencoding {
    /// Percent-encode one URL path segment.
    pub fn encode(segment: &str) -> String {
        let mut out = String::with_capacity(segment.len());
        for byte in segment.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    out.push(byte as char)
                }
                _ => out.push_str(&format!("%{byte:02X}")),
            }
        }
        out
    }
}
