//! Cosine similarity and the duplicate threshold

/// Default cut-off above which two jokes count as the same joke.
///
/// Lower values reject jokes that merely share a topic; higher values let
/// more reworded repeats through.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ, the vectors are empty, or either
/// norm is zero. Mismatched dimensionality is never an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = f64::from(*x);
        let y = f64::from(*y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Strict threshold check: a score equal to the threshold is not a duplicate
pub fn is_near_duplicate(score: f64, threshold: f64) -> bool {
    score > threshold
}
