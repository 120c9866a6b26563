//! Stand-in collaborator for when no Gemini key is configured.
//!
//! Every call fails, which the engine already treats as a normal path:
//! embeddings degrade to the hash fallback.

use async_trait::async_trait;
use jester_core::{CoreError, EmbeddingProvider};

pub struct Offline {
    reason: String,
}

impl Offline {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for Offline {
    async fn embed_content(&self, _text: &str) -> jester_core::Result<Vec<f32>> {
        Err(CoreError::Embedding(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
