//! The AI enhancement fan-out.
//!
//! One enhancement issues a text request and an image request concurrently
//! against the same prompt. Both must succeed; the first failure wins and the
//! sibling request is dropped. Nothing is returned on failure, so callers never
//! observe a half-populated result.

use std::sync::Arc;
use std::time::Instant;

use futures::future;
use serde::Serialize;
use url::Url;

use crate::ai::image::{ImageGenerator, OpenAiImageGenerator};
use crate::ai::prompt::{InlineImage, Prompt};
use crate::ai::text::{GeminiTextGenerator, TextGenerator};
use crate::config::AiConfig;
use crate::error::{AiError, ConfigError, Error, InputError};
use crate::media::MediaProbe;

/// Outcome of one successful enhancement. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AiResult {
    pub generated_text: Option<String>,
    pub generated_image_url: Option<String>,
}

/// What to enhance, detached from any session lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhanceRequest {
    /// Raw text body. Also used for video content, whose body is its URL.
    Text(String),
    /// Image bytes already held locally.
    InlineImage(InlineImage),
    /// Image only reachable remotely; fetched and inlined before prompting.
    RemoteImage(Url),
}

/// Issues and aggregates the two generative calls.
pub struct Enhancer {
    text: Option<Arc<dyn TextGenerator>>,
    image: Option<Arc<dyn ImageGenerator>>,
    fetcher: Arc<dyn MediaProbe>,
}

impl Enhancer {
    /// A `None` generator means its credential is missing; `enhance` then
    /// fails with a configuration error before touching the network.
    pub fn new(
        text: Option<Arc<dyn TextGenerator>>,
        image: Option<Arc<dyn ImageGenerator>>,
        fetcher: Arc<dyn MediaProbe>,
    ) -> Self {
        Self {
            text,
            image,
            fetcher,
        }
    }

    /// Build the Gemini and OpenAI clients for whichever keys are configured.
    pub fn from_config(config: &AiConfig, fetcher: Arc<dyn MediaProbe>) -> Self {
        let text = GeminiTextGenerator::from_config(&config.gemini, config.request_timeout)
            .map(|g| Arc::new(g) as Arc<dyn TextGenerator>);
        let image = OpenAiImageGenerator::from_config(&config.openai, config.request_timeout)
            .map(|g| Arc::new(g) as Arc<dyn ImageGenerator>);
        Self::new(text, image, fetcher)
    }

    /// Whether both credentials are present.
    pub fn is_configured(&self) -> bool {
        self.text.is_some() && self.image.is_some()
    }

    fn providers(&self) -> Result<(&dyn TextGenerator, &dyn ImageGenerator), ConfigError> {
        let text = self
            .text
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential {
                service: "Gemini".to_string(),
                var: "GEMINI_API_KEY".to_string(),
            })?;
        let image = self
            .image
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential {
                service: "OpenAI".to_string(),
                var: "OPENAI_API_KEY".to_string(),
            })?;
        Ok((text, image))
    }

    async fn build_prompt(&self, request: &EnhanceRequest) -> Result<Prompt, Error> {
        match request {
            EnhanceRequest::Text(body) => {
                if body.trim().is_empty() {
                    return Err(InputError::EmptyContent.into());
                }
                Ok(Prompt::text(body.clone()))
            }
            EnhanceRequest::InlineImage(image) => Ok(Prompt::for_image(image.clone())),
            EnhanceRequest::RemoteImage(url) => {
                // Reported as a failed enhancement, not a media load.
                let fetched = self.fetcher.fetch(url).await.map_err(|e| AiError::RequestFailed {
                    provider: "source image".to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Prompt::for_image(InlineImage::from_bytes(
                    &fetched.data,
                    fetched.mime_type,
                )))
            }
        }
    }

    /// Run one enhancement.
    pub async fn enhance(&self, request: &EnhanceRequest) -> Result<AiResult, Error> {
        let (text, image) = self.providers()?;
        let prompt = self.build_prompt(request).await?;
        let image_prompt = prompt.image_prompt();

        let started = Instant::now();
        let (generated_text, generated_image_url) =
            future::try_join(text.generate(&prompt), image.generate(&image_prompt))
                .await
                .map_err(|e| {
                    tracing::warn!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "AI enhancement failed: {}",
                        e
                    );
                    e
                })?;

        tracing::info!(
            text_provider = text.name(),
            image_provider = image.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "AI enhancement complete"
        );

        Ok(AiResult {
            generated_text: Some(generated_text),
            generated_image_url: Some(generated_image_url),
        })
    }
}
