//! Generative AI calls for the Live Demo.
//!
//! - Prompt shaping (inline images, visualization template)
//! - Text generation (Gemini)
//! - Image generation (OpenAI Images)
//! - The concurrent enhancement fan-out

mod image;
mod orchestrator;
mod prompt;
mod text;

pub use image::{ImageGenerator, OpenAiImageGenerator};
pub use orchestrator::{AiResult, EnhanceRequest, Enhancer};
pub use prompt::{
    IMAGE_ANALYSIS_INSTRUCTION, InlineImage, Prompt, strip_inline_image_data,
    visualization_prompt,
};
pub use text::{GeminiTextGenerator, TextGenerator};
