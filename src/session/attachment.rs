//! User-supplied images and their temporary preview URLs.
//!
//! A preview URL stays registered for exactly as long as the [`Attachment`]
//! that owns it. Replacing, clearing or dropping the attachment revokes it.

use crate::{
    error::{Result, StudioError, ValidationError},
    gemini::image_client::{check_attachment_size, validate_image_mime_type},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const PREVIEW_SCHEME: &str = "blob:rgenstudio/";

/// Issues and tracks preview URLs.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> PreviewHandle {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn is_live(&self, url: &str) -> bool {
        let Some(id) = url
            .strip_prefix(PREVIEW_SCHEME)
            .and_then(|raw| Uuid::parse_str(raw).ok())
        else {
            return false;
        };
        self.live
            .lock()
            .map(|live| live.contains(&id))
            .unwrap_or(false)
    }

    fn revoke(&self, id: &Uuid) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(id);
        }
    }
}

/// Owned preview URL; revoked on drop.
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> String {
        format!("{}{}", PREVIEW_SCHEME, self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        log::trace!("Revoking preview {}", self.id);
        self.registry.revoke(&self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.url()).finish()
    }
}

#[derive(Debug)]
pub struct Attachment {
    bytes: Vec<u8>,
    mime_type: String,
    preview: PreviewHandle,
}

impl Attachment {
    /// Validates size (5 MB inclusive) and MIME type, then registers a preview.
    pub fn new(
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        previews: &PreviewRegistry,
    ) -> std::result::Result<Self, ValidationError> {
        let mime_type = mime_type.into();
        check_attachment_size(bytes.len() as u64)?;
        validate_image_mime_type(&mime_type)?;
        if bytes.is_empty() {
            return Err(ValidationError::InvalidImageData("image is empty".into()));
        }
        Ok(Self {
            bytes,
            mime_type,
            preview: previews.issue(),
        })
    }

    /// Reads an image file. Oversized files are rejected from metadata
    /// before their contents are read.
    pub fn from_file(path: &Path, previews: &PreviewRegistry) -> Result<Self> {
        let mime_type = mime_for_path(path).ok_or_else(|| {
            ValidationError::UnsupportedMimeType(
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            )
        })?;
        let size = fs::metadata(path)?.len();
        check_attachment_size(size)?;

        let bytes = fs::read(path)?;
        Attachment::new(bytes, mime_type, previews).map_err(StudioError::from)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn preview_url(&self) -> String {
        self.preview.url()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
