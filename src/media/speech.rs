//! Narration of generated text.
//!
//! The Live Demo can read AI-generated text aloud. Synthesis sits behind the
//! [`SpeechSynthesizer`] trait; the session only ever asks for a clip and
//! later drops it, which is all the speak/stop affordance needs.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};

use crate::config::OpenAiConfig;
use crate::error::MediaError;

/// Synthesized audio.
#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub data: Bytes,
    pub mime_type: String,
}

/// Trait for text-to-speech backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into a playable clip.
    async fn synthesize(&self, text: &str) -> Result<SpeechClip, MediaError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// OpenAI `/audio/speech` backend.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    voice: String,
    max_text_length: usize,
}

impl OpenAiSpeech {
    pub fn new(api_key: SecretString, config: &OpenAiConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.tts_model.clone(),
            voice: config.tts_voice.clone(),
            max_text_length: 4096,
        }
    }

    /// Build from config when an OpenAI key is present.
    pub fn from_config(config: &OpenAiConfig, timeout: Duration) -> Option<Self> {
        config
            .api_key
            .clone()
            .map(|key| Self::new(key, config, timeout))
    }

    /// Set the maximum text length sent in a single request.
    pub fn with_max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }
}

/// Cut `text` to at most `max` bytes on a char boundary.
fn truncate_for_speech(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<SpeechClip, MediaError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MediaError::SpeechFailed {
                reason: "Cannot synthesize empty text".to_string(),
            });
        }

        let input = truncate_for_speech(text, self.max_text_length);
        if input.len() < text.len() {
            tracing::debug!(
                "Narration truncated from {} to {} bytes",
                text.len(),
                input.len()
            );
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": input,
            "voice": self.voice,
            "response_format": "mp3",
        });

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url.trim_end_matches('/')))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| MediaError::SpeechFailed {
                reason: format!("HTTP request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::SpeechFailed {
                reason: format!("OpenAI TTS API returned {}: {}", status, body),
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| MediaError::SpeechFailed {
                reason: format!("Failed to read TTS response body: {}", e),
            })?;

        Ok(SpeechClip {
            data,
            mime_type: "audio/mpeg".to_string(),
        })
    }

    fn name(&self) -> &str {
        "openai_tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        let config = OpenAiConfig::default();
        assert!(OpenAiSpeech::from_config(&config, Duration::from_secs(5)).is_none());

        let config = OpenAiConfig {
            api_key: Some(SecretString::from("key")),
            ..OpenAiConfig::default()
        };
        let speech = OpenAiSpeech::from_config(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(speech.name(), "openai_tts");
        assert_eq!(speech.model, "tts-1");
        assert_eq!(speech.voice, "alloy");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_for_speech("hello", 10), "hello");
        assert_eq!(truncate_for_speech("hello", 3), "hel");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate_for_speech("café", 4), "caf");
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_text() {
        let config = OpenAiConfig {
            api_key: Some(SecretString::from("key")),
            ..OpenAiConfig::default()
        };
        let speech = OpenAiSpeech::from_config(&config, Duration::from_secs(5))
            .unwrap()
            .with_max_text_length(10);
        let result = speech.synthesize("   ").await;
        assert!(matches!(result, Err(MediaError::SpeechFailed { .. })));
    }
}
