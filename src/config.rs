//! Runtime configuration loaded from the environment.
//!
//! Values come from process environment variables, with a `.env` file in the
//! working directory loaded first via `dotenvy`. API keys are optional at
//! startup: the AI feature checks for them lazily on first use so the
//! marketing pages keep working without credentials.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Gemini text/vision settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            text_model: "gemini-2.0-flash".to_string(),
            vision_model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// OpenAI image generation and speech settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub image_style: String,
    pub tts_model: String,
    pub tts_voice: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            image_style: "natural".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
        }
    }
}

/// Everything the AI orchestrator needs to build its providers.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub gemini: GeminiConfig,
    pub openai: OpenAiConfig,
    pub request_timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            openai: OpenAiConfig::default(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub session_ttl: Duration,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            session_ttl: Duration::from_secs(1800),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub ai: AiConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load `.env` (if present) and then read the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let gemini = GeminiConfig {
            api_key: get("GEMINI_API_KEY").map(SecretString::from),
            base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.ai.gemini.base_url),
            text_model: get("GEMINI_TEXT_MODEL").unwrap_or(defaults.ai.gemini.text_model),
            vision_model: get("GEMINI_VISION_MODEL").unwrap_or(defaults.ai.gemini.vision_model),
        };

        let openai = OpenAiConfig {
            api_key: get("OPENAI_API_KEY").map(SecretString::from),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.ai.openai.base_url),
            image_model: get("OPENAI_IMAGE_MODEL").unwrap_or(defaults.ai.openai.image_model),
            image_size: get("OPENAI_IMAGE_SIZE").unwrap_or(defaults.ai.openai.image_size),
            image_quality: get("OPENAI_IMAGE_QUALITY").unwrap_or(defaults.ai.openai.image_quality),
            image_style: get("OPENAI_IMAGE_STYLE").unwrap_or(defaults.ai.openai.image_style),
            tts_model: get("OPENAI_TTS_MODEL").unwrap_or(defaults.ai.openai.tts_model),
            tts_voice: get("OPENAI_TTS_VOICE").unwrap_or(defaults.ai.openai.tts_voice),
        };

        let request_timeout = match get("AI_REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_value::<u64>("AI_REQUEST_TIMEOUT_SECS", &v)?),
            None => defaults.ai.request_timeout,
        };

        let bind = match get("EDUBOARD_BIND") {
            Some(v) => parse_value::<SocketAddr>("EDUBOARD_BIND", &v)?,
            None => defaults.server.bind,
        };

        let session_ttl = match get("DEMO_SESSION_TTL_SECS") {
            Some(v) => Duration::from_secs(parse_value::<u64>("DEMO_SESSION_TTL_SECS", &v)?),
            None => defaults.server.session_ttl,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => parse_value::<usize>("MAX_UPLOAD_BYTES", &v)?,
            None => defaults.server.max_upload_bytes,
        };

        Ok(Self {
            ai: AiConfig {
                gemini,
                openai,
                request_timeout,
            },
            server: ServerConfig {
                bind,
                session_ttl,
                max_upload_bytes,
            },
        })
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.ai.gemini.api_key.is_none());
        assert!(config.ai.openai.api_key.is_none());
        assert_eq!(config.ai.openai.image_model, "dall-e-3");
        assert_eq!(config.ai.openai.image_size, "1024x1024");
        assert_eq!(config.ai.openai.image_quality, "standard");
        assert_eq!(config.ai.openai.image_style, "natural");
        assert_eq!(
            config.server.bind,
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.ai.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_keys_and_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "o-key"),
            ("GEMINI_TEXT_MODEL", "gemini-2.5-pro"),
            ("EDUBOARD_BIND", "0.0.0.0:8080"),
            ("DEMO_SESSION_TTL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(
            config.ai.gemini.api_key.as_ref().unwrap().expose_secret(),
            "g-key"
        );
        assert_eq!(
            config.ai.openai.api_key.as_ref().unwrap().expose_secret(),
            "o-key"
        );
        assert_eq!(config.ai.gemini.text_model, "gemini-2.5-pro");
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.server.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")])).unwrap();
        assert!(config.ai.gemini.api_key.is_none());
    }

    #[test]
    fn test_invalid_numeric_value_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("AI_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "AI_REQUEST_TIMEOUT_SECS"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_bind_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("EDUBOARD_BIND", "nowhere")])).is_err());
    }
}
