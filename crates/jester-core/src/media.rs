//! Screenshots and audio clips as generation input

use std::path::Path;

use base64::Engine as _;
use tracing::debug;

use crate::provider::Part;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// MIME type for a file extension, falling back to PNG or MP3
    pub fn mime_type(self, path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match (self, ext.as_str()) {
            (MediaKind::Image, "jpg" | "jpeg") => "image/jpeg",
            (MediaKind::Image, "webp") => "image/webp",
            (MediaKind::Image, "gif") => "image/gif",
            (MediaKind::Image, _) => "image/png",
            (MediaKind::Audio, "wav") => "audio/wav",
            (MediaKind::Audio, "ogg") => "audio/ogg",
            (MediaKind::Audio, "flac") => "audio/flac",
            (MediaKind::Audio, "aac") => "audio/aac",
            (MediaKind::Audio, "m4a") => "audio/mp4",
            (MediaKind::Audio, _) => "audio/mp3",
        }
    }
}

/// Wrap raw bytes as an inline part
pub fn inline_bytes(bytes: &[u8], mime_type: &str) -> Part {
    let data = base64::engine::general_purpose::STANDARD.encode(bytes);
    Part::inline(mime_type, data)
}

/// Read a media file into an inline part
pub fn load_media(path: &Path, kind: MediaKind) -> Result<Part> {
    let bytes = std::fs::read(path)?;
    let mime_type = kind.mime_type(path);
    debug!(path = %path.display(), mime_type, bytes = bytes.len(), "loaded media");
    Ok(inline_bytes(&bytes, mime_type))
}
