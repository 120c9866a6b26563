//! Jester CLI - jokes that never repeat
//!
//! Usage:
//!   jester generate <context>  - Generate a joke memory has not seen
//!   jester generate --image shot.png
//!   jester add <joke>          - Remember a joke
//!   jester check <joke>        - Is this joke a repeat?
//!   jester similar <query>     - Closest remembered jokes
//!   jester stats | recent | prune | dims

mod offline;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jester_core::config::api_key_from_env;
use jester_core::{
    load_media, EmbeddingProvider, GeminiClient, JesterConfig, JokeMemory, JokeRequest, MediaKind,
    NovelEvent, NovelOutcome,
};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::offline::Offline;
use crate::output::{print_jokes, JokeView};

#[derive(Parser)]
#[command(name = "jester")]
#[command(author = "HeyBattle1")]
#[command(version)]
#[command(about = "Screen-aware joke generator with a memory for repeats", long_about = None)]
struct Cli {
    /// Joke memory snapshot (defaults to ./joke_memory.json)
    #[arg(long, global = true)]
    memory_file: Option<PathBuf>,

    /// Similarity above which two jokes count as the same
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a joke about the given context that has not been told before
    Generate {
        /// What is on screen (slide text, transcript, description)
        context: Vec<String>,

        /// Screenshot to joke about
        #[arg(long)]
        image: Option<PathBuf>,

        /// Audio clip to joke about
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Generation attempts before falling back
        #[arg(long)]
        attempts: Option<u32>,
    },

    /// Remember a joke
    Add {
        joke: String,
    },

    /// Check whether a joke repeats a remembered one
    Check {
        joke: String,
    },

    /// Find the remembered jokes closest to a query
    Similar {
        query: String,

        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Total jokes and jokes from the last 24 hours
    Stats,

    /// Most recent jokes
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Forget jokes older than the retention window
    Prune {
        /// Age in days (defaults to the configured retention)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Embedding dimensionality in use
    Dims,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = JesterConfig::load()?;
    if let Some(path) = cli.memory_file {
        config.memory.snapshot_path = path;
    }
    if let Some(threshold) = cli.threshold {
        config.memory.similarity_threshold = threshold;
    }
    config.validate()?;

    let gemini = match api_key_from_env() {
        Ok(key) => Some(Arc::new(GeminiClient::new(key, config.gemini.clone())?)),
        Err(e) => {
            warn!(error = %e, "no Gemini key, embeddings will use the hash fallback");
            None
        }
    };
    let embedder: Arc<dyn EmbeddingProvider> = match &gemini {
        Some(client) => client.clone(),
        None => Arc::new(Offline::new("GEMINI_API_KEY is not set")),
    };

    let mut memory = JokeMemory::open(embedder, config.memory.clone());

    match cli.command {
        Commands::Generate {
            context,
            image,
            audio,
            attempts,
        } => {
            let Some(generator) = gemini.as_deref() else {
                anyhow::bail!("generate needs GEMINI_API_KEY");
            };
            let context = context.join(" ");

            let mut media = Vec::new();
            if let Some(path) = &image {
                media.push(load_media(path, MediaKind::Image)?);
            }
            if let Some(path) = &audio {
                media.push(load_media(path, MediaKind::Audio)?);
            }
            if context.trim().is_empty() && media.is_empty() {
                anyhow::bail!("generate needs some context, --image or --audio to joke about");
            }

            let request = JokeRequest::text(&context).with_media(&media);
            let outcome = memory
                .generate_novel(generator, request, attempts, |event| match event {
                    NovelEvent::Rejected { attempt, candidate, score } => {
                        let why = match score {
                            Some(s) => format!("{:.1}% similar", s * 100.0),
                            None => "exact repeat".to_string(),
                        };
                        eprintln!("🔄 attempt {}: \"{}\" ({})", attempt, candidate, why);
                    }
                    NovelEvent::GenerationFailed { attempt, error } => {
                        eprintln!("⚠️  attempt {}: {}", attempt, error);
                    }
                    _ => {}
                })
                .await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                    "joke": outcome.text(),
                    "novel": outcome.is_accepted(),
                }))?);
            } else {
                match &outcome {
                    NovelOutcome::Accepted { attempt, .. } => {
                        println!("😂 {}", outcome.text());
                        eprintln!("(fresh joke on attempt {})", attempt);
                    }
                    NovelOutcome::Exhausted { attempts, .. } => {
                        println!("🤷 {}", outcome.text());
                        eprintln!("(no fresh joke after {} attempts)", attempts);
                    }
                }
            }
        }

        Commands::Add { joke } => {
            let entry = memory.add_joke(&joke).await;
            println!("💾 Remembered ({} total): {}", memory.store().len(), entry.preview(60));
        }

        Commands::Check { joke } => {
            let similar = memory.is_joke_similar(&joke).await;
            if cli.json {
                println!("{}", serde_json::json!({ "similar": similar }));
            } else if similar {
                println!("🚫 Already told something like that");
            } else {
                println!("✅ Fresh material");
            }
        }

        Commands::Similar { query, limit } => {
            let hits = memory.find_similar_jokes(&query, limit).await;
            let views: Vec<JokeView> = hits
                .iter()
                .map(|(entry, score)| JokeView::new(entry, Some(*score)))
                .collect();
            print_jokes(&views, cli.json)?;
        }

        Commands::Stats => {
            let stats = memory.joke_stats();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("🧠 {} jokes remembered, {} in the last 24h", stats.total, stats.recent);
                println!(
                    "   repeats above {:.0}% similarity are rejected",
                    memory.similarity_threshold() * 100.0
                );
            }
        }

        Commands::Recent { limit } => {
            let views: Vec<JokeView> = memory
                .recent_jokes(limit)
                .iter()
                .map(|entry| JokeView::new(entry, None))
                .collect();
            print_jokes(&views, cli.json)?;
        }

        Commands::Prune { days } => {
            let removed = match days {
                Some(days) => memory.clear_old_jokes(days),
                None => memory.apply_retention(),
            };
            println!("🧹 Forgot {} old jokes, {} remain", removed, memory.store().len());
        }

        Commands::Dims => {
            println!("{}", memory.embedding_dimensions());
        }
    }

    if memory.degraded_embeddings() > 0 {
        warn!(
            count = memory.degraded_embeddings(),
            "some embeddings used the hash fallback; similarity checks are approximate"
        );
    }

    Ok(())
}
