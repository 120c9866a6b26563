//! Retry-until-novel loop
//!
//! Asks the generator for a joke, checks it against memory, and keeps going
//! until a new one turns up or the attempt budget runs out. Exhaustion is a
//! normal outcome: the fallback joke is remembered and returned. Frontends
//! get progress through a callback, same as the agent loop did.

use jester_memory::entry::preview;
use jester_memory::{JokeEntry, JokeStore};
use tracing::{debug, info, warn};

use crate::dedup::{DedupController, Verdict};
use crate::prompt::{build_parts, clean_candidate};
use crate::provider::{JokeGenerator, Part};

/// Generation attempts before falling back
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Returned when every attempt produced a repeat or failed
pub const DEFAULT_FALLBACK_JOKE: &str =
    "I'd tell you a new joke, but apparently I've already used all of them on you.";

/// What the joke should be about: on-screen text, media, or both
#[derive(Debug, Clone, Copy, Default)]
pub struct JokeRequest<'a> {
    pub context: &'a str,
    pub media: &'a [Part],
}

impl<'a> JokeRequest<'a> {
    pub fn text(context: &'a str) -> Self {
        Self { context, media: &[] }
    }

    pub fn with_media(mut self, media: &'a [Part]) -> Self {
        self.media = media;
        self
    }
}

/// Events emitted while hunting for a novel joke
#[derive(Debug, Clone, PartialEq)]
pub enum NovelEvent {
    /// A generation request is about to be sent
    Attempt { attempt: u32, max_attempts: u32 },
    /// The generator errored or returned nothing usable
    GenerationFailed { attempt: u32, error: String },
    /// The candidate repeats a stored joke (`score` is `None` for exact matches)
    Rejected {
        attempt: u32,
        candidate: String,
        score: Option<f64>,
    },
    /// A novel joke was stored
    Accepted { attempt: u32, text: String },
    /// Budget spent; the fallback joke is used
    Exhausted { attempts: u32, fallback: String },
}

/// Terminal state of one [`generate_novel`] run
#[derive(Debug, Clone, PartialEq)]
pub enum NovelOutcome {
    Accepted { entry: JokeEntry, attempt: u32 },
    Exhausted { entry: JokeEntry, attempts: u32 },
}

impl NovelOutcome {
    /// The joke to show the user
    pub fn text(&self) -> &str {
        &self.entry().text
    }

    pub fn entry(&self) -> &JokeEntry {
        match self {
            NovelOutcome::Accepted { entry, .. } | NovelOutcome::Exhausted { entry, .. } => entry,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, NovelOutcome::Accepted { .. })
    }
}

/// Keep asking `generator` for a joke about `request` until one is novel.
///
/// Makes at most `max_attempts` generation calls (0 is treated as 1). The
/// first novel candidate is stored and returned. Otherwise `fallback` goes
/// through the normal accept path and is returned. Never fails: generator
/// errors only consume an attempt.
pub async fn generate_novel<F>(
    dedup: &DedupController,
    store: &mut JokeStore,
    generator: &dyn JokeGenerator,
    request: JokeRequest<'_>,
    max_attempts: u32,
    fallback: &str,
    mut on_event: F,
) -> NovelOutcome
where
    F: FnMut(NovelEvent),
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        on_event(NovelEvent::Attempt {
            attempt,
            max_attempts,
        });
        debug!(
            attempt,
            max_attempts,
            media = request.media.len(),
            generator = generator.name(),
            "requesting joke"
        );

        let parts = build_parts(request.context, attempt, request.media);
        let raw = match generator.generate_content(&parts).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(attempt, error = %e, "joke generation failed");
                on_event(NovelEvent::GenerationFailed {
                    attempt,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let Some(candidate) = clean_candidate(&raw) else {
            warn!(attempt, "generator returned no usable joke");
            on_event(NovelEvent::GenerationFailed {
                attempt,
                error: "empty response".to_string(),
            });
            continue;
        };

        match dedup.check(store, &candidate).await {
            Verdict::Novel(fingerprint) => {
                let entry = dedup.commit(store, &candidate, fingerprint);
                info!(attempt, joke = %entry.preview(60), "novel joke accepted");
                on_event(NovelEvent::Accepted {
                    attempt,
                    text: entry.text.clone(),
                });
                return NovelOutcome::Accepted { entry, attempt };
            }
            Verdict::ExactDuplicate { .. } => {
                on_event(NovelEvent::Rejected {
                    attempt,
                    candidate,
                    score: None,
                });
            }
            Verdict::NearDuplicate { score, .. } => {
                on_event(NovelEvent::Rejected {
                    attempt,
                    candidate,
                    score: Some(score),
                });
            }
        }
    }

    warn!(
        attempts = max_attempts,
        fallback = %preview(fallback, 60),
        "no novel joke found, using fallback"
    );
    let entry = dedup.accept(store, fallback).await;
    on_event(NovelEvent::Exhausted {
        attempts: max_attempts,
        fallback: entry.text.clone(),
    });
    NovelOutcome::Exhausted {
        entry,
        attempts: max_attempts,
    }
}
