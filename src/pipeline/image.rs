//! Uploaded image handling

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io;
use std::path::{Path, PathBuf};

/// An uploaded image: opaque bytes plus a content-type tag and the storage
/// path it was read from. Loaded once by the caller and referenced by every
/// stage that needs it; immutable after creation.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    path: PathBuf,
    media_type: String,
    data: Vec<u8>,
}

impl ImageAsset {
    /// Reads the image at `path`, deriving the media type from the file
    /// extension. Unrecognized extensions fall back to JPEG, matching what
    /// upload handlers tag by default.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path)?;
        let media_type = media_type_for(&path).to_string();

        Ok(Self {
            path,
            media_type,
            data,
        })
    }

    /// Builds an asset from in-memory bytes (test helper and upload path)
    pub fn from_bytes(path: impl Into<PathBuf>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Base64-encoded image payload for the inference request
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
