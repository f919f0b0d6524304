//! Prompt construction for the two generation calls.

use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;

/// Instruction sent alongside an inline image.
pub const IMAGE_ANALYSIS_INSTRUCTION: &str =
    "Analyze this educational image and generate an enhanced version with improvements";

/// DALL-E 3 rejects prompts longer than this many characters.
const MAX_IMAGE_PROMPT_CHARS: usize = 4000;

static INLINE_IMAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\s*:\s*)?data:image/[A-Za-z0-9.+-]+;base64,[A-Za-z0-9+/=]+")
        .expect("valid inline image regex")
});

/// Image bytes in portable, data-encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload without the `data:` prefix.
    pub data: String,
}

impl InlineImage {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parse a `data:image/...;base64,...` URL.
    pub fn parse_data_url(s: &str) -> Option<Self> {
        let rest = s.trim().strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        if !mime_type.starts_with("image/") || data.is_empty() {
            return None;
        }
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

/// A prompt: text, optionally with one inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<InlineImage>,
}

impl Prompt {
    /// Plain text prompt. An inline data URL pasted into the text is lifted out
    /// into the image slot.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        match INLINE_IMAGE_PATTERN.find(&text) {
            Some(m) => {
                let image = InlineImage::parse_data_url(m.as_str().trim_start_matches([' ', ':']));
                let remaining = strip_inline_image_data(&text);
                let text = if remaining.is_empty() {
                    IMAGE_ANALYSIS_INSTRUCTION.to_string()
                } else {
                    remaining
                };
                Self { text, image }
            }
            None => Self { text, image: None },
        }
    }

    /// The fixed analysis instruction plus an image.
    pub fn for_image(image: InlineImage) -> Self {
        Self {
            text: IMAGE_ANALYSIS_INSTRUCTION.to_string(),
            image: Some(image),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Prompt for the image model: inline image data removed, request wrapped
    /// in the educational visualization template.
    pub fn image_prompt(&self) -> String {
        visualization_prompt(&strip_inline_image_data(&self.text))
    }
}

/// Remove any `data:image/...;base64,...` payloads (and a separating colon)
/// from `text`.
pub fn strip_inline_image_data(text: &str) -> String {
    INLINE_IMAGE_PATTERN.replace_all(text, "").trim().to_string()
}

/// Wrap a request in the fixed visualization template.
pub fn visualization_prompt(request: &str) -> String {
    let template = |request: &str| {
        format!(
            "Create a detailed educational visualization for: {request}.\n\
             Requirements:\n\
             - Clear and professional design\n\
             - Suitable for educational purposes\n\
             - High visual clarity and readability\n\
             - Include relevant educational elements\n\
             - Use appropriate colors and contrast\n\
             Make it engaging and informative for students."
        )
    };

    let overhead = template("").chars().count();
    let budget = MAX_IMAGE_PROMPT_CHARS.saturating_sub(overhead);
    if request.chars().count() <= budget {
        return template(request);
    }

    let clipped: String = request.chars().take(budget).collect();
    template(clipped.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_image_data_url() {
        let image = InlineImage::from_bytes(b"hello", "image/png");
        assert_eq!(image.data, "aGVsbG8=");
        assert_eq!(image.data_url(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(InlineImage::parse_data_url(&image.data_url()), Some(image));
    }

    #[test]
    fn test_parse_data_url_rejects_non_images() {
        assert!(InlineImage::parse_data_url("data:text/plain;base64,aGk=").is_none());
        assert!(InlineImage::parse_data_url("https://example.com/a.png").is_none());
    }

    #[test]
    fn test_text_prompt_has_no_image() {
        let prompt = Prompt::text("Explain the water cycle");
        assert!(!prompt.has_image());
        assert_eq!(prompt.text, "Explain the water cycle");
    }

    #[test]
    fn test_pasted_data_url_moves_to_image_slot() {
        let prompt = Prompt::text("Improve this diagram: data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(prompt.text, "Improve this diagram");
        let image = prompt.image.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "/9j/4AAQ");
    }

    #[test]
    fn test_image_prompt_strips_inline_data() {
        let prompt = Prompt::for_image(InlineImage::from_bytes(&[1, 2, 3], "image/png"));
        let shaped = prompt.image_prompt();
        assert!(!shaped.contains("data:image"));
        assert!(shaped.contains(IMAGE_ANALYSIS_INSTRUCTION));
        assert!(shaped.starts_with("Create a detailed educational visualization for:"));
    }

    #[test]
    fn test_strip_inline_image_data_from_combined_text() {
        let combined = format!(
            "{}: data:image/png;base64,AAAA",
            IMAGE_ANALYSIS_INSTRUCTION
        );
        assert_eq!(strip_inline_image_data(&combined), IMAGE_ANALYSIS_INSTRUCTION);
    }

    #[test]
    fn test_visualization_prompt_is_clipped() {
        let long = "x".repeat(10_000);
        let shaped = visualization_prompt(&long);
        assert!(shaped.chars().count() <= MAX_IMAGE_PROMPT_CHARS);
        assert!(shaped.ends_with("informative for students."));
    }
}
