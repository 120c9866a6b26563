//! Printing jokes for humans and scripts

use chrono::Local;
use jester_memory::JokeEntry;
use serde::Serialize;

/// Joke as shown to users; the embedding is left out
#[derive(Debug, Serialize)]
pub struct JokeView {
    pub id: String,
    pub joke: String,
    pub timestamp: i64,
    #[serde(skip)]
    pub told_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl JokeView {
    pub fn new(entry: &JokeEntry, similarity: Option<f64>) -> Self {
        Self {
            id: entry.id.to_string(),
            joke: entry.text.clone(),
            timestamp: entry.timestamp,
            told_at: local_time(entry),
            similarity,
        }
    }
}

fn local_time(entry: &JokeEntry) -> String {
    entry
        .created_at()
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}

pub fn print_jokes(views: &[JokeView], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(views)?);
        return Ok(());
    }
    if views.is_empty() {
        println!("No jokes remembered yet.");
        return Ok(());
    }
    for view in views {
        match view.similarity {
            Some(score) => println!(
                "• [{}] ({:.1}%) {}",
                view.told_at,
                score * 100.0,
                view.joke
            ),
            None => println!("• [{}] {}", view.told_at, view.joke),
        }
    }
    Ok(())
}
