//! Terminal versions of the Live Demo flows.

use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::demo::{ContentItem, DemoServices};
use crate::error::InputError;
use crate::media::{MediaKind, UploadedFile};

/// Classify a URL and print the result.
pub async fn run_classify_command(config: &Config, input: &str) -> anyhow::Result<()> {
    let services = DemoServices::from_config(config);
    let classification = services
        .classifier
        .classify(input)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("URL:     {}", classification.url);
    println!("Kind:    {}", classification.kind);
    println!(
        "Preview: {}",
        if classification.source.is_local() {
            "cached locally"
        } else {
            "remote"
        }
    );
    Ok(())
}

/// Run one enhancement and print the generated text and image URL.
pub async fn run_enhance_command(
    config: &Config,
    text: Option<String>,
    file: Option<&Path>,
    url: Option<&str>,
) -> anyhow::Result<()> {
    let services = DemoServices::from_config(config);

    let content = match (text, file, url) {
        (Some(text), _, _) => ContentItem::text(text),
        (None, Some(path), _) => {
            let upload = UploadedFile::from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let name = upload.name.clone();
            let outcome = services.uploads.accept(upload)?;
            ContentItem::from_upload(&name, outcome)
        }
        (None, None, Some(url)) => {
            let classification = services
                .classifier
                .classify(url)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            ContentItem::from_classification(classification)
        }
        (None, None, None) => {
            anyhow::bail!("{} (use --text, --file, or --url)", InputError::EmptyContent)
        }
    };

    if content.media_kind() != MediaKind::None {
        println!("Enhancing {} content...", content.media_kind());
    }

    let request = content.enhance_request()?;
    let result = services
        .enhancer
        .enhance(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("{}", result.generated_text.as_deref().unwrap_or_default());
    println!();
    println!(
        "Image: {}",
        result.generated_image_url.as_deref().unwrap_or("(none)")
    );
    Ok(())
}
