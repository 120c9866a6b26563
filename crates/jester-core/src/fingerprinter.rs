//! Hash + embedding for a piece of text, with a deterministic fallback
//! when the embedding service is down.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jester_memory::{content_hash, fallback_embedding};
use tracing::warn;

use crate::provider::EmbeddingProvider;

pub struct Fingerprinter {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
    /// Number of embeddings served by the fallback this session
    degraded: AtomicU64,
}

impl Fingerprinter {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimensions: usize) -> Self {
        Self {
            provider,
            dimensions,
            degraded: AtomicU64::new(0),
        }
    }

    /// Normalized content hash
    pub fn hash(&self, text: &str) -> String {
        content_hash(text)
    }

    /// Embed via the provider, falling back to the hash-derived vector on any
    /// failure. Never fails.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match self.provider.embed_content(text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                self.degraded.fetch_add(1, Ordering::Relaxed);
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "embedding failed, using hash fallback"
                );
                fallback_embedding(text, self.dimensions)
            }
        }
    }

    /// Configured dimensionality for fallback vectors and empty stores
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// How many embeddings came from the fallback so far
    pub fn degraded_count(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }
}
