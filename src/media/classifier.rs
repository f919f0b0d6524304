//! URL classification for the Live Demo.
//!
//! A submitted URL is classified by extension first. Only when no extension
//! matches is the resource probed over the network, as an image and then as a
//! video. Images matched by extension are also fetched into a local preview,
//! falling back to the remote URL when the fetch is refused (typically by
//! cross-origin or hotlink protection).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::{Error, MediaError};
use crate::media::detection::{
    MediaKind, kind_from_content_type, kind_from_url, mime_from_path, parse_media_url, sniff_media,
};
use crate::media::preview::{MediaSource, PreviewStore};

/// Bytes fetched for a remote resource.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub data: Bytes,
    pub mime_type: String,
}

/// Network access used by the classifier. Swapped out in tests.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Download a resource in full.
    async fn fetch(&self, url: &Url) -> Result<FetchedMedia, MediaError>;

    /// Check that a resource loads as `kind` (image or video).
    async fn probe(&self, url: &Url, kind: MediaKind) -> Result<(), MediaError>;
}

/// Result of classifying a URL.
#[derive(Debug)]
pub struct Classification {
    pub url: Url,
    pub kind: MediaKind,
    pub source: MediaSource,
}

/// Classifies URLs and caches image previews.
pub struct UrlClassifier {
    probe: Arc<dyn MediaProbe>,
    previews: PreviewStore,
}

impl UrlClassifier {
    pub fn new(probe: Arc<dyn MediaProbe>, previews: PreviewStore) -> Self {
        Self { probe, previews }
    }

    /// Validate `input` as a URL and classify it. Malformed input is rejected
    /// before any network access.
    pub async fn classify(&self, input: &str) -> Result<Classification, Error> {
        let url = parse_media_url(input)?;
        self.classify_url(url).await
    }

    /// Classify an already parsed URL.
    pub async fn classify_url(&self, url: Url) -> Result<Classification, Error> {
        match kind_from_url(&url) {
            Some(MediaKind::Video) => {
                tracing::debug!(%url, "Classified as video by extension");
                Ok(Classification {
                    source: MediaSource::Remote(url.clone()),
                    url,
                    kind: MediaKind::Video,
                })
            }
            Some(MediaKind::Image) => {
                tracing::debug!(%url, "Classified as image by extension");
                let source = self.cache_image(&url).await;
                Ok(Classification {
                    url,
                    kind: MediaKind::Image,
                    source,
                })
            }
            _ => self.classify_by_probe(url).await,
        }
    }

    async fn cache_image(&self, url: &Url) -> MediaSource {
        match self.probe.fetch(url).await {
            Ok(fetched) => {
                MediaSource::Local(self.previews.acquire(fetched.data, fetched.mime_type))
            }
            Err(e) => {
                tracing::warn!(%url, "Image fetch failed, using remote URL for preview: {}", e);
                MediaSource::Remote(url.clone())
            }
        }
    }

    async fn classify_by_probe(&self, url: Url) -> Result<Classification, Error> {
        for kind in [MediaKind::Image, MediaKind::Video] {
            match self.probe.probe(&url, kind).await {
                Ok(()) => {
                    tracing::debug!(%url, %kind, "Classified by probe");
                    return Ok(Classification {
                        source: MediaSource::Remote(url.clone()),
                        url,
                        kind,
                    });
                }
                Err(e) => tracing::debug!(%url, %kind, "Probe failed: {}", e),
            }
        }

        Err(MediaError::NoValidMedia {
            url: url.to_string(),
        }
        .into())
    }
}

/// `reqwest`-backed probe.
pub struct HttpMediaProbe {
    client: reqwest::Client,
}

impl HttpMediaProbe {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, MediaError> {
        ensure_public_host(url)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MediaError::DownloadFailed {
                reason: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::DownloadFailed {
                reason: format!("{} returned {}", url, status),
            });
        }
        Ok(response)
    }
}

fn header_mime(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_lowercase())
        .filter(|v| !v.is_empty() && v != "application/octet-stream")
}

#[async_trait]
impl MediaProbe for HttpMediaProbe {
    async fn fetch(&self, url: &Url) -> Result<FetchedMedia, MediaError> {
        let response = self.get(url).await?;
        let declared = header_mime(&response);

        let data = response
            .bytes()
            .await
            .map_err(|e| MediaError::DownloadFailed {
                reason: format!("Failed to read response body: {}", e),
            })?;

        let mime_type = declared
            .or_else(|| sniff_media(&data).map(|(m, _)| m.to_string()))
            .or_else(|| mime_from_path(url.path()))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(FetchedMedia { data, mime_type })
    }

    async fn probe(&self, url: &Url, kind: MediaKind) -> Result<(), MediaError> {
        let mut response = self.get(url).await?;

        let detected = match header_mime(&response) {
            Some(mime) => kind_from_content_type(&mime),
            None => {
                let head = response
                    .chunk()
                    .await
                    .map_err(|e| MediaError::DownloadFailed {
                        reason: format!("Failed to read response body: {}", e),
                    })?
                    .unwrap_or_default();
                sniff_media(&head)
                    .map(|(_, k)| k)
                    .unwrap_or(MediaKind::Text)
            }
        };

        if detected == kind {
            Ok(())
        } else {
            Err(MediaError::LoadFailed {
                reason: format!("{} is not a loadable {}", url, kind),
            })
        }
    }
}

/// Refuse to fetch loopback, private, and metadata addresses on behalf of a
/// visitor.
fn ensure_public_host(url: &Url) -> Result<(), MediaError> {
    let Some(host) = url.host_str() else {
        return Err(MediaError::DownloadFailed {
            reason: "URL has no host".to_string(),
        });
    };

    let lower = host.to_lowercase();
    let blocked = lower == "localhost"
        || lower == "127.0.0.1"
        || lower == "[::1]"
        || lower == "0.0.0.0"
        || lower.starts_with("10.")
        || lower.starts_with("192.168.")
        || lower.starts_with("169.254.")
        || is_private_172(&lower)
        || lower.ends_with(".internal")
        || lower.ends_with(".local");

    if blocked {
        return Err(MediaError::DownloadFailed {
            reason: format!("URL points to internal/private address: {}", host),
        });
    }
    Ok(())
}

fn is_private_172(host: &str) -> bool {
    host.strip_prefix("172.")
        .and_then(|rest| rest.split('.').next())
        .and_then(|octet| octet.parse::<u8>().ok())
        .is_some_and(|octet| (16..=31).contains(&octet))
}
