//! Jester configuration
//!
//! Read from `~/.jester/config.json` when present; every field has a default
//! so a missing file or a partial one both work. A handful of environment
//! variables override the file. The Gemini API key only ever comes from the
//! environment and is never written back.

use std::path::{Path, PathBuf};

use jester_memory::{DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_SNAPSHOT_FILE};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::novel::{DEFAULT_FALLBACK_JOKE, DEFAULT_MAX_ATTEMPTS};
use crate::{CoreError, Result};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const THRESHOLD_ENV: &str = "JESTER_SIMILARITY_THRESHOLD";
pub const MEMORY_FILE_ENV: &str = "JESTER_MEMORY_FILE";

/// Gemini REST settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            embedding_model: "embedding-001".to_string(),
            generation_model: "gemini-2.0-flash".to_string(),
            temperature: 0.9,
            request_timeout_secs: 60,
        }
    }
}

/// Joke memory and dedup settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Snapshot file; relative paths resolve against the working directory
    pub snapshot_path: PathBuf,
    pub similarity_threshold: f64,
    pub embedding_dimensions: usize,
    pub max_attempts: u32,
    pub retention_days: u32,
    pub fallback_joke: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retention_days: 30,
            fallback_joke: DEFAULT_FALLBACK_JOKE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JesterConfig {
    pub gemini: GeminiConfig,
    pub memory: MemoryConfig,
}

impl JesterConfig {
    /// `~/.jester/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".jester").join("config.json"))
    }

    /// Load from the default path, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Invalid {}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(THRESHOLD_ENV) {
            self.memory.similarity_threshold = raw
                .trim()
                .parse()
                .map_err(|_| CoreError::Config(format!("{} is not a number: {}", THRESHOLD_ENV, raw)))?;
        }
        if let Some(path) = lookup(MEMORY_FILE_ENV) {
            if !path.trim().is_empty() {
                self.memory.snapshot_path = PathBuf::from(path);
            }
        }
        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let t = self.memory.similarity_threshold;
        if !(-1.0..=1.0).contains(&t) {
            return Err(CoreError::Config(format!(
                "similarity_threshold must be within -1..=1, got {}",
                t
            )));
        }
        if self.memory.max_attempts == 0 {
            return Err(CoreError::Config("max_attempts must be at least 1".to_string()));
        }
        if self.memory.embedding_dimensions == 0 {
            return Err(CoreError::Config(
                "embedding_dimensions must be at least 1".to_string(),
            ));
        }
        if self.memory.fallback_joke.trim().is_empty() {
            return Err(CoreError::Config("fallback_joke must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Gemini API key from the environment
pub fn api_key_from_env() -> Result<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::new)
        .ok_or_else(|| CoreError::Config(format!("{} is not set", API_KEY_ENV)))
}
