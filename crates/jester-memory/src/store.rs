//! Joke store backed by a single JSON snapshot
//!
//! The whole collection lives in memory and every mutation rewrites the
//! snapshot in full. Writes go to a sibling temp file that is renamed over
//! the snapshot, so a crash mid-write leaves the previous snapshot intact.
//! Persistence is best effort: a broken or unwritable file degrades to an
//! empty or unsaved memory, never to an error for the host.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::entry::JokeEntry;
use crate::fingerprint::content_hash;
use crate::similarity::cosine_similarity;
use crate::{Result, DAY_MS};

/// Snapshot file name, resolved against the working directory by default
pub const DEFAULT_SNAPSHOT_FILE: &str = "joke_memory.json";

/// Counts reported by [`JokeStore::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JokeStats {
    pub total: usize,
    /// Jokes created within the last 24 hours
    pub recent: usize,
}

/// In-memory joke collection mirrored to a JSON file
#[derive(Debug)]
pub struct JokeStore {
    path: PathBuf,
    jokes: Vec<JokeEntry>,
}

impl JokeStore {
    /// Load the snapshot at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and also yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let jokes = match read_snapshot(&path) {
            Ok(Some(jokes)) => rehash(jokes),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "joke memory unreadable, starting empty");
                Vec::new()
            }
        };
        info!(path = %path.display(), count = jokes.len(), "joke memory loaded");
        Self { path, jokes }
    }

    /// Snapshot location
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.jokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jokes.is_empty()
    }

    /// All entries, in no meaningful order
    pub fn iter(&self) -> impl Iterator<Item = &JokeEntry> {
        self.jokes.iter()
    }

    /// Linear scan returning every entry matching `predicate`
    pub fn query<P>(&self, mut predicate: P) -> Vec<&JokeEntry>
    where
        P: FnMut(&JokeEntry) -> bool,
    {
        self.jokes.iter().filter(|j| predicate(j)).collect()
    }

    /// Whether any entry carries this content hash
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.jokes.iter().any(|j| j.content_hash == hash)
    }

    /// Entry with this content hash, if any
    pub fn find_by_hash(&self, hash: &str) -> Option<&JokeEntry> {
        self.jokes.iter().find(|j| j.content_hash == hash)
    }

    /// Append an entry and rewrite the snapshot
    pub fn insert(&mut self, entry: JokeEntry) {
        debug!(id = %entry.id, "inserting joke");
        self.jokes.push(entry);
        self.save();
    }

    /// Drop every entry created before `cutoff_ms`, then rewrite the snapshot.
    ///
    /// Returns the number of entries removed.
    pub fn purge_older_than(&mut self, cutoff_ms: i64) -> usize {
        let before = self.jokes.len();
        self.jokes.retain(|j| j.timestamp >= cutoff_ms);
        let removed = before - self.jokes.len();
        info!(removed, remaining = self.jokes.len(), "purged old jokes");
        self.save();
        removed
    }

    /// Newest entries first, at most `limit`
    pub fn recent(&self, limit: usize) -> Vec<JokeEntry> {
        let mut sorted: Vec<&JokeEntry> = self.jokes.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted.into_iter().take(limit).cloned().collect()
    }

    /// Total count and count created in the 24 hours before `now_ms`
    pub fn stats(&self, now_ms: i64) -> JokeStats {
        let one_day_ago = now_ms - DAY_MS;
        JokeStats {
            total: self.jokes.len(),
            recent: self.jokes.iter().filter(|j| j.timestamp > one_day_ago).count(),
        }
    }

    /// Every entry scored against `query`, best match first, at most `limit`
    pub fn rank_by_similarity(&self, query: &[f32], limit: usize) -> Vec<(JokeEntry, f64)> {
        let mut scored: Vec<(&JokeEntry, f64)> = self
            .jokes
            .iter()
            .map(|j| (j, cosine_similarity(query, &j.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .take(limit)
            .map(|(j, score)| (j.clone(), score))
            .collect()
    }

    /// Dimensionality of the stored embeddings, or `default` when empty
    pub fn embedding_dimensions(&self, default: usize) -> usize {
        self.jokes
            .first()
            .map(|j| j.embedding.len())
            .unwrap_or(default)
    }

    /// Rewrite the snapshot, logging and swallowing any failure
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            warn!(path = %self.path.display(), error = %e, "failed to save joke memory");
        }
    }

    /// Rewrite the snapshot, reporting failures to the caller
    pub fn try_save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(&self.jokes)?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = self.jokes.len(), "joke memory saved");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_snapshot(path: &Path) -> Result<Option<Vec<JokeEntry>>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    let jokes = serde_json::from_str(&data)?;
    Ok(Some(jokes))
}

/// Re-derive every hash from its text and drop entries whose hash repeats.
///
/// Earlier releases stored MD5 digests; after this pass every stored hash
/// matches what `content_hash` produces today.
fn rehash(jokes: Vec<JokeEntry>) -> Vec<JokeEntry> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(jokes.len());
    for mut joke in jokes {
        joke.content_hash = content_hash(&joke.text);
        if seen.insert(joke.content_hash.clone()) {
            kept.push(joke);
        } else {
            debug!(id = %joke.id, "dropping repeated joke from snapshot");
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    fn entry(text: &str, embedding: Vec<f32>, timestamp: i64) -> JokeEntry {
        JokeEntry::new(text, embedding).at(timestamp)
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = JokeStore::load(dir.path().join(DEFAULT_SNAPSHOT_FILE));
        assert!(store.is_empty());
        assert_eq!(store.embedding_dimensions(768), 768);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let tmp = NamedTempFile::new().unwrap();
        fs::write(tmp.path(), "{ this is not json").unwrap();

        let store = JokeStore::load(tmp.path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SNAPSHOT_FILE);

        let mut store = JokeStore::load(&path);
        store.insert(entry("Another synergy slide", vec![0.1, 0.2, 0.3], 100));
        store.insert(entry("Pie charts, the sequel", vec![0.3, 0.2, 0.1], 200));

        let reloaded = JokeStore::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains_hash(&content_hash("another synergy slide")));
        assert_eq!(reloaded.embedding_dimensions(768), 3);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_snapshot_is_pretty_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SNAPSHOT_FILE);

        let mut store = JokeStore::load(&path);
        store.insert(entry("Quarterly vibes", vec![1.0], 1));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["joke"], "Quarterly vibes");
    }

    #[test]
    fn test_load_rehashes_legacy_entries() {
        let tmp = NamedTempFile::new().unwrap();
        let raw = r#"[
            {"id": "1b4e28ba-2fa1-41d2-883f-0016d3cca427", "joke": "Synergy!", "jokeEmbedding": [1.0], "timestamp": 1, "hash": "aaaa"},
            {"id": "2b4e28ba-2fa1-41d2-883f-0016d3cca427", "joke": "  synergy! ", "jokeEmbedding": [1.0], "timestamp": 2, "hash": "bbbb"}
        ]"#;
        fs::write(tmp.path(), raw).unwrap();

        let store = JokeStore::load(tmp.path());
        assert_eq!(store.len(), 1);
        assert!(store.contains_hash(&content_hash("synergy!")));
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let dir = tempdir().unwrap();
        let mut store = JokeStore::load(dir.path().join(DEFAULT_SNAPSHOT_FILE));
        store.insert(entry("a", vec![1.0], 100));
        store.insert(entry("b", vec![1.0], 300));
        store.insert(entry("c", vec![1.0], 200));

        let recent = store.recent(2);
        let stamps: Vec<i64> = recent.iter().map(|j| j.timestamp).collect();
        assert_eq!(stamps, vec![300, 200]);

        // Stored order untouched
        let stored: Vec<i64> = store.iter().map(|j| j.timestamp).collect();
        assert_eq!(stored, vec![100, 300, 200]);
    }

    #[test]
    fn test_purge_removes_only_older_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SNAPSHOT_FILE);
        let mut store = JokeStore::load(&path);
        store.insert(entry("old", vec![1.0], 999));
        store.insert(entry("edge", vec![1.0], 1_000));
        store.insert(entry("new", vec![1.0], 5_000));

        let removed = store.purge_older_than(1_000);
        assert_eq!(removed, 1);

        let reloaded = JokeStore::load(&path);
        let mut texts: Vec<String> = reloaded.iter().map(|j| j.text.clone()).collect();
        texts.sort();
        assert_eq!(texts, vec!["edge", "new"]);
    }

    #[test]
    fn test_stats_counts_last_day() {
        let dir = tempdir().unwrap();
        let mut store = JokeStore::load(dir.path().join(DEFAULT_SNAPSHOT_FILE));
        let now = 10 * DAY_MS;
        store.insert(entry("yesterday-ish", vec![1.0], now - DAY_MS));
        store.insert(entry("an hour ago", vec![1.0], now - 60 * 60 * 1000));
        store.insert(entry("just now", vec![1.0], now));

        assert_eq!(store.stats(now), JokeStats { total: 3, recent: 2 });
    }

    #[test]
    fn test_rank_by_similarity() {
        let dir = tempdir().unwrap();
        let mut store = JokeStore::load(dir.path().join(DEFAULT_SNAPSHOT_FILE));
        store.insert(entry("east", vec![1.0, 0.0], 1));
        store.insert(entry("north", vec![0.0, 1.0], 2));
        store.insert(entry("north-east", vec![1.0, 1.0], 3));
        store.insert(entry("wrong dims", vec![1.0, 0.0, 0.0], 4));

        let ranked = store.rank_by_similarity(&[0.0, 1.0], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.text, "north");
        assert_eq!(ranked[1].0.text, "north-east");
        assert!(ranked[0].1 > ranked[1].1);
    }

    #[test]
    fn test_query_filters() {
        let dir = tempdir().unwrap();
        let mut store = JokeStore::load(dir.path().join(DEFAULT_SNAPSHOT_FILE));
        store.insert(entry("Zoom fatigue", vec![1.0], 1));
        store.insert(entry("Slide 47 of 300", vec![1.0], 2));

        let hits = store.query(|j| j.text.contains("Zoom"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].timestamp, 1);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        // A directory where the snapshot file should be makes the rename fail
        let path = dir.path().join("occupied");
        fs::create_dir_all(path.join("child")).unwrap();

        let mut store = JokeStore::load(&path);
        assert!(store.is_empty());
        store.insert(entry("still remembered", vec![1.0], 1));
        assert_eq!(store.len(), 1);
        assert!(store.try_save().is_err());
    }
}
