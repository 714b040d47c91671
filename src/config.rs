//! Configuration for the study session engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub study: StudyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            study: StudyConfig::default(),
        }
    }
}

impl Config {
    /// Load from the platform config directory, falling back to
    /// defaults on any problem.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "study-session")
            .map(|d| d.config_dir().join("config.toml"))
    }
}

/// Where the flashcard backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout for both the due-card fetch and grade writes.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Maximum cards taken into one session queue.
    #[serde(default = "default_review_limit")]
    pub review_limit: Option<usize>,
}

fn default_review_limit() -> Option<usize> {
    Some(200)
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            review_limit: default_review_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            base_url = "https://cards.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "https://cards.example.com");
        assert_eq!(config.server.timeout_secs, 10);
        assert_eq!(config.study.review_limit, Some(200));
    }
}
