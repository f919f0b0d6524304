//! The content currently loaded into a demo session.

use crate::ai::{EnhanceRequest, InlineImage};
use crate::error::MediaError;
use crate::media::{Classification, MediaKind, MediaSource, UploadOutcome};

/// Text, image, or video content plus where its preview is rendered from.
///
/// A source is only ever attached to image or video content; the
/// constructors are the only way to build one.
#[derive(Debug, Default)]
pub struct ContentItem {
    text_body: String,
    media_kind: MediaKind,
    source: Option<MediaSource>,
}

impl ContentItem {
    /// Nothing loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Typed or decoded text.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            text_body: body.into(),
            media_kind: MediaKind::Text,
            source: None,
        }
    }

    /// An image shown from `source`, captioned by `text_body`.
    pub fn image(text_body: impl Into<String>, source: MediaSource) -> Self {
        Self {
            text_body: text_body.into(),
            media_kind: MediaKind::Image,
            source: Some(source),
        }
    }

    /// A video shown from `source`, captioned by `text_body`.
    pub fn video(text_body: impl Into<String>, source: MediaSource) -> Self {
        Self {
            text_body: text_body.into(),
            media_kind: MediaKind::Video,
            source: Some(source),
        }
    }

    /// Content from a classified URL. The text body is the URL itself.
    pub fn from_classification(classification: Classification) -> Self {
        let body = classification.url.to_string();
        match classification.kind {
            MediaKind::Video => Self::video(body, classification.source),
            _ => Self::image(body, classification.source),
        }
    }

    /// Content from an accepted upload. Media is captioned by its file name.
    pub fn from_upload(file_name: &str, outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Text { body } => Self::text(body),
            UploadOutcome::Media { kind, handle } => {
                let source = MediaSource::Local(handle);
                if kind == MediaKind::Video {
                    Self::video(file_name, source)
                } else {
                    Self::image(file_name, source)
                }
            }
        }
    }

    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    /// `src` for rendering the preview.
    pub fn preview_href(&self) -> Option<String> {
        self.source.as_ref().map(MediaSource::href)
    }

    /// Whether there is anything to enhance.
    pub fn has_content(&self) -> bool {
        self.source.is_some() || !self.text_body.trim().is_empty()
    }

    /// Snapshot what the orchestrator needs so it can run without holding the
    /// session.
    pub fn enhance_request(&self) -> Result<EnhanceRequest, MediaError> {
        match (&self.media_kind, &self.source) {
            (MediaKind::Image, Some(MediaSource::Local(handle))) => {
                let (data, mime_type) = handle
                    .contents()
                    .ok_or(MediaError::PreviewReleased { id: handle.id() })?;
                Ok(EnhanceRequest::InlineImage(InlineImage::from_bytes(
                    &data, mime_type,
                )))
            }
            (MediaKind::Image, Some(MediaSource::Remote(url))) => {
                Ok(EnhanceRequest::RemoteImage(url.clone()))
            }
            _ => Ok(EnhanceRequest::Text(self.text_body.clone())),
        }
    }
}
