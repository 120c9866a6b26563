//! Content fingerprints
//!
//! Two halves: a normalized SHA-256 content hash for exact duplicates, and a
//! deterministic hash-derived vector used in place of a real embedding when
//! the embedding service is unreachable. The fallback vector carries no
//! semantics at all; it only keeps the similarity scan running.

use sha2::{Digest, Sha256};

/// Dimensionality of Gemini `embedding-001` vectors
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;

/// Lower-case and trim text before hashing
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Hex SHA-256 of the normalized text.
///
/// Case and surrounding whitespace do not affect the result.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Deterministic stand-in embedding derived from the text's digest.
///
/// Each digest byte `b` becomes `(b - 128) / 128`. Past the end of the
/// digest the vector is padded with the value of a zero byte (-1.0).
pub fn fallback_embedding(text: &str, dimensions: usize) -> Vec<f32> {
    let mut hasher = Sha256::new();
    hasher.update(text.to_lowercase().as_bytes());
    let digest = hasher.finalize();

    (0..dimensions)
        .map(|i| {
            let byte = digest.get(i).copied().unwrap_or(0x00);
            (f32::from(byte) - 128.0) / 128.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    #[test]
    fn test_hash_ignores_case_and_outer_whitespace() {
        let texts = ["Oh great, another synergy slide", "  OH GREAT, another Synergy slide\n"];
        for t in texts {
            assert_eq!(content_hash(t), content_hash(&normalize(t)));
        }
        assert_eq!(content_hash(texts[0]), content_hash(texts[1]));
    }

    #[test]
    fn test_hash_is_fixed_length_hex() {
        let h = content_hash("pie charts");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(h, content_hash("bar charts"));
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let a = fallback_embedding("Zoom call bingo", 768);
        let b = fallback_embedding("Zoom call bingo", 768);
        assert_eq!(a, b);
        assert_eq!(a.len(), 768);
    }

    #[test]
    fn test_fallback_differs_between_texts() {
        let a = fallback_embedding("Zoom call bingo", 768);
        let b = fallback_embedding("Spreadsheet karaoke", 768);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fallback_byte_mapping_and_padding() {
        let v = fallback_embedding("anything", 40);
        assert_eq!(v.len(), 40);

        let digest = Sha256::digest(b"anything");
        for (i, byte) in digest.iter().enumerate() {
            assert_eq!(v[i], (f32::from(*byte) - 128.0) / 128.0);
        }
        // zero-byte padding past the digest
        assert!(v[32..].iter().all(|x| *x == -1.0));
    }

    #[test]
    fn test_fallback_shorter_than_digest() {
        let v = fallback_embedding("anything", 4);
        assert_eq!(v.len(), 4);
        assert_eq!(v, fallback_embedding("ANYTHING", 768)[..4].to_vec());
    }
}
