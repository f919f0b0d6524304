//! Error types for eduboard.

use std::time::Duration;

use serde::Serialize;

/// Top-level error type for the demo core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("AI service error: {0}")]
    Ai(#[from] AiError),

    #[error("Demo error: {0}")]
    Demo(#[from] DemoError),
}

/// Coarse error classification surfaced to the Live Demo page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationError,
    InvalidInput,
    MediaLoadError,
    AiServiceError,
    NotFound,
    Conflict,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ConfigurationError => "configuration_error",
            Self::InvalidInput => "invalid_input",
            Self::MediaLoadError => "media_load_error",
            Self::AiServiceError => "ai_service_error",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
        };
        write!(f, "{}", s)
    }
}

impl Error {
    /// Classify this error for the UI.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::ConfigurationError,
            Self::Input(_) => ErrorKind::InvalidInput,
            Self::Media(_) => ErrorKind::MediaLoadError,
            Self::Ai(_) => ErrorKind::AiServiceError,
            Self::Demo(DemoError::SessionNotFound { .. }) => ErrorKind::NotFound,
            Self::Demo(DemoError::SpeechUnavailable) => ErrorKind::ConfigurationError,
            Self::Demo(_) => ErrorKind::Conflict,
        }
    }

    /// Message shown to the visitor. Never contains credentials.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Input(e) => e.to_string(),
            Self::Media(MediaError::NoValidMedia { .. }) => {
                "Please enter a valid image or video URL".to_string()
            }
            Self::Media(e) => format!("{}. Please try again.", e),
            Self::Ai(e) => format!("Failed to generate AI content: {}. Please try again.", e),
            Self::Demo(e) => e.to_string(),
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{service} API key is not set. Please add {var} to your .env file.")]
    MissingCredential { service: String, var: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejected visitor input. Messages are shown verbatim.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Please enter a URL starting with http:// or https://")]
    NoUrlFound,

    #[error("Please enter a valid URL")]
    MalformedUrl { input: String },

    #[error("Please enter some text to generate AI content")]
    EmptyContent,

    #[error("Unsupported URL scheme: {scheme}")]
    UnsupportedScheme { scheme: String },
}

/// Media load and preview errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("No valid image or video found at {url}")]
    NoValidMedia { url: String },

    #[error("Failed to load media: {reason}")]
    LoadFailed { reason: String },

    #[error("File {name} is not valid UTF-8 text")]
    UndecodableText { name: String },

    #[error("Media download failed: {reason}")]
    DownloadFailed { reason: String },

    #[error("Preview {id} has been released")]
    PreviewReleased { id: uuid::Uuid },

    #[error("Speech synthesis failed: {reason}")]
    SpeechFailed { reason: String },
}

/// Downstream generative AI failures.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("{provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("{provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid or missing {provider} API key")]
    AuthFailed { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Session-level conflicts raised by the demo state machine.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DemoError {
    #[error("AI content is already being generated")]
    GenerationInProgress,

    #[error("Cannot switch view from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Demo session {id} not found")]
    SessionNotFound { id: uuid::Uuid },

    #[error("Narration is only available for generated AI text")]
    NothingToNarrate,

    #[error("Narration is not available. Please add OPENAI_API_KEY to your .env file.")]
    SpeechUnavailable,
}

/// HTTP server startup errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Server failed to start: {reason}")]
    StartupFailed { reason: String },
}

/// Result type alias for the demo core.
pub type Result<T> = std::result::Result<T, Error>;
