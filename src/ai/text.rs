//! Text generation via Google Gemini.
//!
//! Plain prompts go to the configured text model. Prompts carrying an inline
//! image are sent as a multi-part `generateContent` request (text plus
//! `inlineData`) to the vision model.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ai::prompt::Prompt;
use crate::config::GeminiConfig;
use crate::error::AiError;

const PROVIDER: &str = "gemini";

/// Trait for text generation backends.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`.
    async fn generate(&self, prompt: &Prompt) -> Result<String, AiError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// Gemini `generateContent` client.
pub struct GeminiTextGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    text_model: String,
    vision_model: String,
}

impl GeminiTextGenerator {
    pub fn new(api_key: SecretString, config: &GeminiConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
        }
    }

    /// Build from config when a Gemini key is present.
    pub fn from_config(config: &GeminiConfig, timeout: Duration) -> Option<Self> {
        config
            .api_key
            .clone()
            .map(|key| Self::new(key, config, timeout))
    }

    /// Model a prompt is routed to.
    fn model_for(&self, prompt: &Prompt) -> &str {
        if prompt.has_image() {
            &self.vision_model
        } else {
            &self.text_model
        }
    }

    fn build_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            model,
            self.api_key.expose_secret()
        )
    }

    fn build_request(prompt: &Prompt) -> GeminiRequest {
        let mut parts = vec![GeminiPart::Text {
            text: prompt.text.clone(),
        }];
        if let Some(image) = &prompt.image {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
        }
    }
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Join the text parts of the first candidate.
fn extract_text(response: GeminiResponse) -> Result<String, AiError> {
    let candidate = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| AiError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "No candidates in response".to_string(),
        })?;

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| match p {
                    GeminiPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AiError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!(
                "Empty response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, AiError> {
        let model = self.model_for(prompt);
        tracing::debug!(model, with_image = prompt.has_image(), "Requesting Gemini generation");

        let response = self
            .client
            .post(self.build_url(model))
            .json(&Self::build_request(prompt))
            .send()
            .await
            .map_err(|e| AiError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("HTTP request failed: {}", e.without_url()),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AiError::AuthFailed {
                provider: PROVIDER.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited {
                provider: PROVIDER.to_string(),
                retry_after: None,
            });
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let msg = serde_json::from_str::<GeminiErrorResponse>(&error_text)
                .ok()
                .and_then(|e| e.error.map(|d| d.message))
                .unwrap_or(error_text);
            return Err(AiError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Status {}: {}", status, msg),
            });
        }

        let gemini_resp: GeminiResponse =
            response.json().await.map_err(|e| AiError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to parse response: {}", e.without_url()),
            })?;

        extract_text(gemini_resp)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::prompt::InlineImage;

    fn generator() -> GeminiTextGenerator {
        let config = GeminiConfig {
            api_key: Some(SecretString::from("test-key-123")),
            text_model: "gemini-text".to_string(),
            vision_model: "gemini-vision".to_string(),
            ..GeminiConfig::default()
        };
        GeminiTextGenerator::from_config(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(
            GeminiTextGenerator::from_config(&GeminiConfig::default(), Duration::from_secs(5))
                .is_none()
        );
    }

    #[test]
    fn test_model_routing() {
        let generator = generator();
        assert_eq!(generator.model_for(&Prompt::text("hi")), "gemini-text");

        let image = InlineImage::from_bytes(&[1, 2, 3], "image/png");
        assert_eq!(generator.model_for(&Prompt::for_image(image)), "gemini-vision");
    }

    #[test]
    fn test_build_url() {
        let url = generator().build_url("gemini-text");
        assert!(url.starts_with("https://generativelanguage.googleapis.com/v1beta/models/"));
        assert!(url.contains("gemini-text:generateContent"));
        assert!(url.contains("key=test-key-123"));
    }

    #[test]
    fn test_request_with_inline_image() {
        let image = InlineImage::from_bytes(b"hello", "image/jpeg");
        let request = GeminiTextGenerator::build_request(&Prompt::for_image(image));
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(json["contents"][0]["role"], "user");
        assert!(parts[0]["text"].as_str().unwrap().starts_with("Analyze"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "aGVsbG8=");
    }

    #[test]
    fn test_request_text_only() {
        let request = GeminiTextGenerator::build_request(&Prompt::text("Explain gravity"));
        let json = serde_json::to_value(&request).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "Explain gravity");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Gravity "}, {"text": "pulls."}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Gravity pulls.");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: GeminiResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(AiError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_extract_text_blocked_candidate() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
