//! Duplicate detection against the joke store
//!
//! Two stages. An exact match on the normalized content hash short-circuits
//! before any embedding call. Otherwise the candidate is embedded once and
//! compared with every stored joke; anything strictly above the threshold
//! is a near duplicate. A novel verdict carries the fingerprint so the
//! commit does not pay for a second embedding.

use jester_memory::entry::preview;
use jester_memory::{cosine_similarity, is_near_duplicate, JokeEntry, JokeStore};
use tracing::{debug, info};
use uuid::Uuid;

use crate::fingerprinter::Fingerprinter;

/// Hash and embedding of one text
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub hash: String,
    pub embedding: Vec<f32>,
}

/// Outcome of checking a candidate against the store
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Same normalized text is already stored
    ExactDuplicate { existing: Uuid },
    /// A stored joke scored above the threshold
    NearDuplicate { existing: Uuid, score: f64 },
    /// Nothing close; ready to commit
    Novel(Fingerprint),
}

impl Verdict {
    pub fn is_duplicate(&self) -> bool {
        !matches!(self, Verdict::Novel(_))
    }
}

pub struct DedupController {
    fingerprinter: Fingerprinter,
    threshold: f64,
}

impl DedupController {
    pub fn new(fingerprinter: Fingerprinter, threshold: f64) -> Self {
        Self {
            fingerprinter,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    /// Classify `candidate` against everything in `store`
    pub async fn check(&self, store: &JokeStore, candidate: &str) -> Verdict {
        let hash = self.fingerprinter.hash(candidate);
        if let Some(existing) = store.find_by_hash(&hash) {
            info!(candidate = %preview(candidate, 50), "exact duplicate");
            return Verdict::ExactDuplicate {
                existing: existing.id,
            };
        }

        let embedding = self.fingerprinter.embed(candidate).await;

        for joke in store.iter() {
            let score = cosine_similarity(&embedding, &joke.embedding);
            if is_near_duplicate(score, self.threshold) {
                info!(
                    candidate = %preview(candidate, 60),
                    existing = %joke.preview(60),
                    similarity = %format!("{:.1}%", score * 100.0),
                    "similar joke detected"
                );
                return Verdict::NearDuplicate {
                    existing: joke.id,
                    score,
                };
            }
        }

        debug!(candidate = %preview(candidate, 50), "candidate is novel");
        Verdict::Novel(Fingerprint { hash, embedding })
    }

    /// Whether `candidate` repeats something already stored
    pub async fn is_duplicate(&self, store: &JokeStore, candidate: &str) -> bool {
        self.check(store, candidate).await.is_duplicate()
    }

    /// Fingerprint `candidate` from scratch and store it
    pub async fn accept(&self, store: &mut JokeStore, candidate: &str) -> JokeEntry {
        let hash = self.fingerprinter.hash(candidate);
        if let Some(existing) = store.find_by_hash(&hash) {
            debug!(id = %existing.id, "joke already stored, skipping insert");
            return existing.clone();
        }
        let embedding = self.fingerprinter.embed(candidate).await;
        self.commit(store, candidate, Fingerprint { hash, embedding })
    }

    /// Store `candidate` with a fingerprint computed earlier by [`check`](Self::check).
    ///
    /// An entry with the same hash is returned instead of inserting a second one.
    pub fn commit(&self, store: &mut JokeStore, candidate: &str, fingerprint: Fingerprint) -> JokeEntry {
        if let Some(existing) = store.find_by_hash(&fingerprint.hash) {
            return existing.clone();
        }
        let entry = JokeEntry::with_hash(candidate, fingerprint.embedding, fingerprint.hash);
        store.insert(entry.clone());
        info!(
            total = store.len(),
            joke = %entry.preview(60),
            "joke saved to memory"
        );
        entry
    }
}
