//! Jester Memory - Persistent joke memory
//!
//! Every joke Jester has told lives here with its fingerprint: a
//! normalized content hash for exact matches and an embedding vector
//! for near-duplicate detection. The whole collection is mirrored to a
//! single JSON snapshot.

pub mod entry;
pub mod fingerprint;
pub mod similarity;
pub mod store;

pub use entry::JokeEntry;
pub use fingerprint::{content_hash, fallback_embedding, DEFAULT_EMBEDDING_DIMENSIONS};
pub use similarity::{cosine_similarity, is_near_duplicate, DEFAULT_SIMILARITY_THRESHOLD};
pub use store::{JokeStats, JokeStore, DEFAULT_SNAPSHOT_FILE};

/// Errors from memory operations
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// Milliseconds in one day, used by the retention and stats windows
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
