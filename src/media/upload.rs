//! Handling for locally selected files.

use std::path::Path;

use bytes::Bytes;

use crate::error::MediaError;
use crate::media::detection::{MediaKind, kind_from_content_type, mime_from_path};
use crate::media::preview::{PreviewHandle, PreviewStore};

/// A file as received from a form upload or read from disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Declared content type. Empty when the client didn't send one.
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, declaring its content type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let data = std::fs::read(path).map_err(|e| MediaError::LoadFailed {
            reason: format!("Cannot read {}: {}", path.display(), e),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let content_type = mime_from_path(&name).unwrap_or_default();
        Ok(Self::new(name, content_type, data))
    }
}

/// What an accepted upload became.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Decoded text content.
    Text { body: String },
    /// Image or video bytes behind a transient reference.
    Media { kind: MediaKind, handle: PreviewHandle },
}

/// Turns uploaded files into demo content.
#[derive(Clone)]
pub struct UploadHandler {
    previews: PreviewStore,
}

impl UploadHandler {
    pub fn new(previews: PreviewStore) -> Self {
        Self { previews }
    }

    /// Accept one file. The kind comes from the declared content type alone.
    pub fn accept(&self, file: UploadedFile) -> Result<UploadOutcome, MediaError> {
        let kind = kind_from_content_type(&file.content_type);
        tracing::info!(
            name = %file.name,
            content_type = %file.content_type,
            bytes = file.data.len(),
            %kind,
            "Accepted upload"
        );

        match kind {
            MediaKind::Image | MediaKind::Video => Ok(UploadOutcome::Media {
                kind,
                handle: self.previews.acquire(file.data, file.content_type),
            }),
            _ => {
                let body = String::from_utf8(file.data.to_vec())
                    .map_err(|_| MediaError::UndecodableText { name: file.name })?;
                Ok(UploadOutcome::Text { body })
            }
        }
    }
}
