//! Jester Core - Joke dedup engine and generation loop
//!
//! Wires the joke memory to the outside world: embedding and generation
//! collaborators, the duplicate check, and the loop that keeps asking for
//! jokes until one is new. Frontends talk to [`JokeMemory`].

pub mod config;
pub mod dedup;
pub mod fingerprinter;
pub mod gemini;
pub mod media;
pub mod memory;
pub mod novel;
pub mod prompt;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{GeminiConfig, JesterConfig, MemoryConfig};
pub use dedup::{DedupController, Fingerprint, Verdict};
pub use fingerprinter::Fingerprinter;
pub use gemini::GeminiClient;
pub use media::{load_media, MediaKind};
pub use memory::JokeMemory;
pub use novel::{generate_novel, JokeRequest, NovelEvent, NovelOutcome, DEFAULT_FALLBACK_JOKE, DEFAULT_MAX_ATTEMPTS};
pub use provider::{EmbeddingProvider, JokeGenerator, Part};

/// Core errors
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Generation service error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
