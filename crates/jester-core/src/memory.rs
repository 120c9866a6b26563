//! Joke memory facade
//!
//! The operations the rest of the application calls. Owns the store for the
//! lifetime of the host and lends it to the dedup controller and the
//! generation loop on each call.

use std::sync::Arc;

use jester_memory::{now_ms, JokeEntry, JokeStats, JokeStore, DAY_MS};
use tracing::info;

use crate::config::MemoryConfig;
use crate::dedup::DedupController;
use crate::fingerprinter::Fingerprinter;
use crate::novel::{generate_novel, JokeRequest, NovelEvent, NovelOutcome};
use crate::provider::{EmbeddingProvider, JokeGenerator};

pub struct JokeMemory {
    store: JokeStore,
    dedup: DedupController,
    config: MemoryConfig,
}

impl JokeMemory {
    /// Wire a memory around an already loaded store
    pub fn new(store: JokeStore, embedder: Arc<dyn EmbeddingProvider>, config: MemoryConfig) -> Self {
        let fingerprinter = Fingerprinter::new(embedder, config.embedding_dimensions);
        let dedup = DedupController::new(fingerprinter, config.similarity_threshold);
        info!(
            jokes = store.len(),
            path = %store.path().display(),
            threshold = config.similarity_threshold,
            "joke memory initialized"
        );
        Self { store, dedup, config }
    }

    /// Load the snapshot named in `config` and wire a memory around it
    pub fn open(embedder: Arc<dyn EmbeddingProvider>, config: MemoryConfig) -> Self {
        let store = JokeStore::load(config.snapshot_path.clone());
        Self::new(store, embedder, config)
    }

    pub fn store(&self) -> &JokeStore {
        &self.store
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Similarity above which a joke counts as a repeat
    pub fn similarity_threshold(&self) -> f64 {
        self.dedup.threshold()
    }

    /// Remember a joke unconditionally (exact repeats map to the stored entry)
    pub async fn add_joke(&mut self, joke: &str) -> JokeEntry {
        self.dedup.accept(&mut self.store, joke).await
    }

    /// Whether `joke` repeats or closely resembles a remembered joke
    pub async fn is_joke_similar(&self, joke: &str) -> bool {
        self.dedup.is_duplicate(&self.store, joke).await
    }

    /// Remembered jokes closest to `query`, best first, with their scores
    pub async fn find_similar_jokes(&self, query: &str, limit: usize) -> Vec<(JokeEntry, f64)> {
        let embedding = self.dedup.fingerprinter().embed(query).await;
        self.store.rank_by_similarity(&embedding, limit)
    }

    /// Total jokes and jokes from the last 24 hours
    pub fn joke_stats(&self) -> JokeStats {
        self.store.stats(now_ms())
    }

    /// Newest jokes first
    pub fn recent_jokes(&self, limit: usize) -> Vec<JokeEntry> {
        self.store.recent(limit)
    }

    /// Forget jokes older than `days_old` days. Returns how many were removed.
    pub fn clear_old_jokes(&mut self, days_old: u32) -> usize {
        let cutoff = now_ms() - i64::from(days_old) * DAY_MS;
        self.store.purge_older_than(cutoff)
    }

    /// Apply the configured retention window
    pub fn apply_retention(&mut self) -> usize {
        self.clear_old_jokes(self.config.retention_days)
    }

    /// Dimensionality of stored embeddings, or the configured default
    pub fn embedding_dimensions(&self) -> usize {
        self.store
            .embedding_dimensions(self.dedup.fingerprinter().dimensions())
    }

    /// Embeddings served by the hash fallback this session
    pub fn degraded_embeddings(&self) -> u64 {
        self.dedup.fingerprinter().degraded_count()
    }

    /// Generate a joke about `request` that memory has not seen before
    pub async fn generate_novel<F>(
        &mut self,
        generator: &dyn JokeGenerator,
        request: JokeRequest<'_>,
        max_attempts: Option<u32>,
        on_event: F,
    ) -> NovelOutcome
    where
        F: FnMut(NovelEvent),
    {
        let attempts = max_attempts.unwrap_or(self.config.max_attempts);
        generate_novel(
            &self.dedup,
            &mut self.store,
            generator,
            request,
            attempts,
            &self.config.fallback_joke,
            on_event,
        )
        .await
    }
}
