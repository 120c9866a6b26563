//! Collaborator traits for the remote AI services
//!
//! The engine never talks HTTP directly. It sees these two traits, so tests
//! and alternative backends can stand in for Gemini.

use async_trait::async_trait;

/// Turns text into an embedding vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Any failure is reported, never retried here.
    async fn embed_content(&self, text: &str) -> crate::Result<Vec<f32>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// One piece of a generation request
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Binary media, base64 encoded, sent alongside the prompt
    InlineData { mime_type: String, data: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(self, Part::InlineData { .. })
    }
}

/// Produces joke text from a prompt and optional media
#[async_trait]
pub trait JokeGenerator: Send + Sync {
    /// Send the request parts and get the raw model text back
    async fn generate_content(&self, parts: &[Part]) -> crate::Result<String>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
