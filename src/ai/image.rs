//! Image generation via the OpenAI Images API.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;
use crate::error::AiError;

const PROVIDER: &str = "openai";

/// Trait for image generation backends.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image for `prompt` and return its URL.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// `POST /images/generations` client.
pub struct OpenAiImageGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    size: String,
    quality: String,
    style: String,
}

impl OpenAiImageGenerator {
    pub fn new(api_key: SecretString, config: &OpenAiConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.image_model.clone(),
            size: config.image_size.clone(),
            quality: config.image_quality.clone(),
            style: config.image_style.clone(),
        }
    }

    /// Build from config when an OpenAI key is present.
    pub fn from_config(config: &OpenAiConfig, timeout: Duration) -> Option<Self> {
        config
            .api_key
            .clone()
            .map(|key| Self::new(key, config, timeout))
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ImageRequest<'a> {
        ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            quality: &self.quality,
            style: &self.style,
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: Option<OpenAiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn first_image_url(response: ImageResponse) -> Result<String, AiError> {
    response
        .data
        .into_iter()
        .next()
        .and_then(|d| d.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AiError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "No image URL received from OpenAI".to_string(),
        })
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        tracing::debug!(model = %self.model, size = %self.size, "Requesting image generation");

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| AiError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("HTTP request failed: {}", e),
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
                retry_after: retry_after(&response),
            });
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let msg = serde_json::from_str::<OpenAiErrorResponse>(&error_text)
                .ok()
                .and_then(|e| e.error.map(|d| d.message))
                .unwrap_or(error_text);
            return Err(AiError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Status {}: {}", status, msg),
            });
        }

        let body: ImageResponse = response.json().await.map_err(|e| AiError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!("Failed to parse response: {}", e),
        })?;

        first_image_url(body)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn generator() -> OpenAiImageGenerator {
        let config = OpenAiConfig {
            api_key: Some(SecretString::from("sk-test")),
            ..OpenAiConfig::default()
        };
        OpenAiImageGenerator::from_config(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(
            OpenAiImageGenerator::from_config(&OpenAiConfig::default(), Duration::from_secs(5))
                .is_none()
        );
    }

    #[test]
    fn test_request_parameters() {
        let generator = generator();
        let json = serde_json::to_value(generator.build_request("a labelled cell")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "dall-e-3",
                "prompt": "a labelled cell",
                "n": 1,
                "size": "1024x1024",
                "quality": "standard",
                "style": "natural",
            })
        );
    }

    #[test]
    fn test_first_image_url() {
        let response: ImageResponse = serde_json::from_value(serde_json::json!({
            "created": 1,
            "data": [{"url": "https://images.example.com/1.png", "revised_prompt": "x"}]
        }))
        .unwrap();
        assert_eq!(
            first_image_url(response).unwrap(),
            "https://images.example.com/1.png"
        );
    }

    #[test]
    fn test_missing_image_url_is_an_error() {
        for body in [
            serde_json::json!({"data": []}),
            serde_json::json!({"data": [{"b64_json": "AAAA"}]}),
            serde_json::json!({}),
        ] {
            let response: ImageResponse = serde_json::from_value(body).unwrap();
            let err = first_image_url(response).unwrap_err();
            assert!(err.to_string().contains("No image URL received from OpenAI"));
        }
    }
}
