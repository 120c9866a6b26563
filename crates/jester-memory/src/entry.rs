//! Joke entries as they are persisted

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fingerprint::content_hash;

/// A single remembered joke.
///
/// Field names on disk (`joke`, `jokeEmbedding`, `hash`) match the snapshots
/// written by earlier releases, so old memory files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JokeEntry {
    /// Unique identifier
    pub id: Uuid,
    /// The joke itself
    #[serde(rename = "joke")]
    pub text: String,
    /// Semantic embedding of the joke
    #[serde(rename = "jokeEmbedding")]
    pub embedding: Vec<f32>,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Hex digest of the normalized text
    #[serde(rename = "hash")]
    pub content_hash: String,
}

impl JokeEntry {
    /// Create a new entry stamped with a fresh id and the current time
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        let text = text.into();
        let content_hash = content_hash(&text);
        Self::with_hash(text, embedding, content_hash)
    }

    /// Create a new entry reusing an already computed content hash
    pub fn with_hash(text: impl Into<String>, embedding: Vec<f32>, content_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            embedding,
            timestamp: crate::now_ms(),
            content_hash,
        }
    }

    /// Override the creation time
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Creation time as a UTC datetime
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Short single-line preview for logs
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.text, max_chars)
    }
}

/// Truncate text on a char boundary, appending an ellipsis when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}
