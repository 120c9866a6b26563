//! Gemini REST client
//!
//! One client serves both collaborators: `embedContent` for embeddings and
//! `generateContent` for jokes. Responses are parsed loosely as JSON values
//! and API error bodies are surfaced as service errors. Screenshots and audio
//! clips travel as `inlineData` parts next to the prompt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::provider::{EmbeddingProvider, JokeGenerator, Part};
use crate::{CoreError, Result};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: SecretString,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    /// POST a JSON body; non-2xx replies become `service_error` with status and message
    async fn post(
        &self,
        url: &str,
        body: &Value,
        service_error: fn(String) -> CoreError,
    ) -> Result<Value> {
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret().as_str())
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        debug!(url, status = status.as_u16(), "gemini response");
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gemini request failed");
            return Err(service_error(status_error(status, &text)));
        }
        let json: Value = resp.json().await?;
        Ok(json)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed_content(&self, text: &str) -> Result<Vec<f32>> {
        let model = &self.config.embedding_model;
        let body = serde_json::json!({
            "model": format!("models/{}", model),
            "content": { "parts": [{ "text": text }] },
        });
        let json = self
            .post(&self.endpoint(model, "embedContent"), &body, CoreError::Embedding)
            .await?;
        parse_embedding(&json)
    }

    fn name(&self) -> &str {
        &self.config.embedding_model
    }
}

#[async_trait]
impl JokeGenerator for GeminiClient {
    async fn generate_content(&self, parts: &[Part]) -> Result<String> {
        let model = &self.config.generation_model;
        let body = generation_body(parts, self.config.temperature);
        let json = self
            .post(&self.endpoint(model, "generateContent"), &body, CoreError::Generation)
            .await?;
        parse_generation(&json)
    }

    fn name(&self) -> &str {
        &self.config.generation_model
    }
}

fn part_json(part: &Part) -> Value {
    match part {
        Part::Text(text) => serde_json::json!({ "text": text }),
        Part::InlineData { mime_type, data } => serde_json::json!({
            "inlineData": { "mimeType": mime_type, "data": data }
        }),
    }
}

/// `generateContent` request body for one user turn
pub fn generation_body(parts: &[Part], temperature: f32) -> Value {
    let parts: Vec<Value> = parts.iter().map(part_json).collect();
    serde_json::json!({
        "contents": [{ "parts": parts }],
        "generationConfig": { "temperature": temperature },
    })
}

/// Message for a non-2xx reply: the API's `error.message` when the body has
/// one, else the raw body text
pub fn status_error(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| api_error(&json))
        .unwrap_or_else(|| {
            let text = body.trim();
            if text.is_empty() {
                "no response body".to_string()
            } else {
                jester_memory::entry::preview(text, 200)
            }
        });
    format!("HTTP {}: {}", status, detail)
}

fn api_error(json: &Value) -> Option<String> {
    json.get("error").map(|err| {
        err["message"]
            .as_str()
            .unwrap_or("Unknown API error")
            .to_string()
    })
}

/// Extract `embedding.values` from an `embedContent` response
pub fn parse_embedding(json: &Value) -> Result<Vec<f32>> {
    if let Some(msg) = api_error(json) {
        return Err(CoreError::Embedding(msg));
    }
    let values = json["embedding"]["values"]
        .as_array()
        .ok_or_else(|| CoreError::Embedding("response missing embedding.values".to_string()))?;
    let embedding: Vec<f32> = values
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();
    if embedding.is_empty() || embedding.len() != values.len() {
        return Err(CoreError::Embedding("malformed embedding values".to_string()));
    }
    Ok(embedding)
}

/// Concatenate the text parts of the first candidate in a `generateContent` response
pub fn parse_generation(json: &Value) -> Result<String> {
    if let Some(msg) = api_error(json) {
        return Err(CoreError::Generation(msg));
    }
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = json["promptFeedback"]["blockReason"]
                .as_str()
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "response missing candidates/content/parts".to_string());
            CoreError::Generation(reason)
        })?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.trim().is_empty() {
        return Err(CoreError::Generation("empty response".to_string()));
    }
    Ok(text)
}
