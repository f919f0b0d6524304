//! Media handling for the Live Demo.
//!
//! - Media kind detection (extensions, content types, magic bytes)
//! - URL classification with network probing fallback
//! - Upload handling
//! - Transient preview references
//! - Narration (text-to-speech)

mod classifier;
mod detection;
mod preview;
mod speech;
mod upload;

pub use classifier::{Classification, FetchedMedia, HttpMediaProbe, MediaProbe, UrlClassifier};
pub use detection::{
    IMAGE_EXTENSIONS, MediaKind, VIDEO_EXTENSIONS, extract_url, kind_from_content_type,
    kind_from_extension, kind_from_url, mime_from_path, parse_media_url, sniff_media,
};
pub use preview::{MediaSource, PREVIEW_ROUTE_PREFIX, PreviewHandle, PreviewStore};
pub use speech::{OpenAiSpeech, SpeechClip, SpeechSynthesizer};
pub use upload::{UploadHandler, UploadOutcome, UploadedFile};
