//! Media kind detection for URLs, uploads, and raw bytes.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::InputError;

/// Image extensions recognized without probing.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".svg"];

/// Video extensions recognized without probing.
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".ogg", ".mov"];

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid url regex"));

/// What a piece of demo content is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Nothing entered yet.
    #[default]
    None,
    Image,
    Video,
    Text,
}

impl MediaKind {
    /// Whether content of this kind is previewed from a media source.
    pub fn has_source(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Match a string's suffix against the known image and video extensions.
///
/// Case-insensitive. The two extension sets are disjoint.
pub fn kind_from_extension(s: &str) -> Option<MediaKind> {
    let lower = s.to_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Some(MediaKind::Image);
    }
    if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Some(MediaKind::Video);
    }
    None
}

/// Extension match on a parsed URL: the full string first, then the path alone
/// so query strings and fragments don't hide the extension.
pub fn kind_from_url(url: &Url) -> Option<MediaKind> {
    kind_from_extension(url.as_str()).or_else(|| kind_from_extension(url.path()))
}

/// Kind from a declared content type, as used for uploads.
pub fn kind_from_content_type(content_type: &str) -> MediaKind {
    let lower = content_type.trim().to_lowercase();
    if lower.starts_with("image/") {
        MediaKind::Image
    } else if lower.starts_with("video/") {
        MediaKind::Video
    } else {
        MediaKind::Text
    }
}

/// Sniff image/video magic bytes. Returns the MIME type and kind.
pub fn sniff_media(data: &[u8]) -> Option<(&'static str, MediaKind)> {
    if data.len() < 4 {
        return None;
    }

    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some(("image/png", MediaKind::Image));
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(("image/jpeg", MediaKind::Image));
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some(("image/gif", MediaKind::Image));
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some(("image/webp", MediaKind::Image));
    }
    if data.starts_with(b"BM") {
        return Some(("image/bmp", MediaKind::Image));
    }
    if data.len() >= 8 && (&data[4..8] == b"ftyp" || &data[4..8] == b"moov") {
        if data.len() >= 12 && &data[8..12] == b"qt  " {
            return Some(("video/quicktime", MediaKind::Video));
        }
        return Some(("video/mp4", MediaKind::Video));
    }
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(("video/webm", MediaKind::Video));
    }
    if data.starts_with(b"OggS") {
        return Some(("video/ogg", MediaKind::Video));
    }
    if let Ok(text) = std::str::from_utf8(&data[..data.len().min(512)]) {
        let trimmed = text.trim_start();
        if trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && trimmed.contains("<svg"))
        {
            return Some(("image/svg+xml", MediaKind::Image));
        }
    }

    None
}

/// Parse a string that must be a well-formed absolute `http(s)` URL.
pub fn parse_media_url(input: &str) -> Result<Url, InputError> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|_| InputError::MalformedUrl {
        input: trimmed.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(InputError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(InputError::MalformedUrl {
            input: trimmed.to_string(),
        });
    }

    Ok(url)
}

/// Pull the first `http://` or `https://` URL out of free text.
pub fn extract_url(input: &str) -> Result<Url, InputError> {
    let found = URL_PATTERN
        .find(input)
        .ok_or(InputError::NoUrlFound)?
        .as_str();
    parse_media_url(found)
}

/// Guess a MIME type from a file name or URL path.
pub fn mime_from_path(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions_classify_as_image() {
        for ext in IMAGE_EXTENSIONS {
            let url = format!("https://example.com/diagram{}", ext);
            assert_eq!(kind_from_extension(&url), Some(MediaKind::Image), "{}", url);
        }
    }

    #[test]
    fn test_video_extensions_classify_as_video() {
        for ext in VIDEO_EXTENSIONS {
            let url = format!("https://example.com/lesson{}", ext);
            assert_eq!(kind_from_extension(&url), Some(MediaKind::Video), "{}", url);
        }
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(
            kind_from_extension("https://example.com/PHOTO.JPG"),
            Some(MediaKind::Image)
        );
        assert_eq!(
            kind_from_extension("https://example.com/Clip.MoV"),
            Some(MediaKind::Video)
        );
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(kind_from_extension("https://example.com/page"), None);
        assert_eq!(kind_from_extension("https://example.com/notes.txt"), None);
    }

    #[test]
    fn test_kind_from_url_ignores_query() {
        let url = Url::parse("https://example.com/diagram.png?size=large").unwrap();
        assert_eq!(kind_from_url(&url), Some(MediaKind::Image));
    }

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(kind_from_content_type("image/png"), MediaKind::Image);
        assert_eq!(kind_from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(kind_from_content_type("text/plain"), MediaKind::Text);
        assert_eq!(kind_from_content_type(""), MediaKind::Text);
        assert_eq!(
            kind_from_content_type("application/octet-stream"),
            MediaKind::Text
        );
    }

    #[test]
    fn test_sniff_png_and_webm() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(sniff_media(&png), Some(("image/png", MediaKind::Image)));

        let webm = [0x1A, 0x45, 0xDF, 0xA3, 0x01, 0x00];
        assert_eq!(sniff_media(&webm), Some(("video/webm", MediaKind::Video)));
    }

    #[test]
    fn test_sniff_mp4() {
        let data = b"\x00\x00\x00\x18ftypmp42";
        assert_eq!(sniff_media(data), Some(("video/mp4", MediaKind::Video)));
    }

    #[test]
    fn test_sniff_html_is_not_media() {
        assert_eq!(sniff_media(b"<!DOCTYPE html><html>"), None);
    }

    #[test]
    fn test_parse_rejects_non_urls() {
        assert!(matches!(
            parse_media_url("not a url"),
            Err(InputError::MalformedUrl { .. })
        ));
        assert!(matches!(
            parse_media_url("ftp://example.com/x.png"),
            Err(InputError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_extract_url_from_surrounding_text() {
        let url = extract_url("look at https://example.com/a.png please").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a.png");
    }

    #[test]
    fn test_extract_url_requires_scheme() {
        assert!(matches!(
            extract_url("not a url"),
            Err(InputError::NoUrlFound)
        ));
        assert!(matches!(
            extract_url("example.com/a.png"),
            Err(InputError::NoUrlFound)
        ));
    }

    #[test]
    fn test_extract_url_rejects_broken_match() {
        assert!(matches!(
            extract_url("http://"),
            Err(InputError::NoUrlFound) | Err(InputError::MalformedUrl { .. })
        ));
        assert!(matches!(
            extract_url("see http://[broken"),
            Err(InputError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path("notes.txt").as_deref(), Some("text/plain"));
        assert_eq!(mime_from_path("photo.png").as_deref(), Some("image/png"));
        assert_eq!(mime_from_path("no_extension"), None);
    }
}
