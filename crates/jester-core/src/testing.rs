//! In-crate fakes for the remote collaborators

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{EmbeddingProvider, JokeGenerator, Part};
use crate::CoreError;

const FAKE_DIMS: usize = 16;

/// Embedder returning pinned vectors, or a distinct basis vector per unseen
/// text so unrelated jokes score 0 against each other.
pub struct FakeEmbedder {
    pinned: Mutex<HashMap<String, Vec<f32>>>,
    assigned: Mutex<Vec<String>>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            pinned: Mutex::new(HashMap::new()),
            assigned: Mutex::new(Vec::new()),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn set(&self, text: &str, embedding: Vec<f32>) {
        self.pinned.lock().unwrap().insert(text.to_string(), embedding);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed_content(&self, text: &str) -> crate::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CoreError::Embedding("service unavailable".to_string()));
        }
        if let Some(v) = self.pinned.lock().unwrap().get(text) {
            return Ok(v.clone());
        }
        let mut assigned = self.assigned.lock().unwrap();
        let index = match assigned.iter().position(|t| t == text) {
            Some(i) => i,
            None => {
                assigned.push(text.to_string());
                assigned.len() - 1
            }
        };
        let mut v = vec![0.0; FAKE_DIMS];
        v[index % FAKE_DIMS] = 1.0;
        Ok(v)
    }

    fn name(&self) -> &str {
        "fake-embedder"
    }
}

/// Generator replaying a script; the last step repeats once the script runs out
pub struct FakeGenerator {
    script: Vec<Result<String, String>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<Part>>>,
}

impl FakeGenerator {
    pub fn scripted(script: Vec<Result<&str, &str>>) -> Self {
        assert!(!script.is_empty(), "script needs at least one step");
        Self {
            script: script
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::scripted(vec![Ok(text)])
    }

    pub fn always_failing() -> Self {
        Self::scripted(vec![Err("service unavailable")])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<Vec<Part>> {
        self.requests.lock().unwrap().clone()
    }

    /// The text parts of each request, joined
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| match p {
                        Part::Text(t) => Some(t.as_str()),
                        Part::InlineData { .. } => None,
                    })
                    .collect::<String>()
            })
            .collect()
    }
}

#[async_trait]
impl JokeGenerator for FakeGenerator {
    async fn generate_content(&self, parts: &[Part]) -> crate::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(parts.to_vec());
        let step = &self.script[n.min(self.script.len() - 1)];
        step.clone().map_err(CoreError::Generation)
    }

    fn name(&self) -> &str {
        "fake-generator"
    }
}
