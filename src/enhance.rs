//! Prompt enhancement
//!
//! Turns the user's text and optional reference image into the final prompt
//! sent to the image model. With a reference image, a vision model writes a
//! style-specific description of the product and the user's text is appended
//! as a clarification.

use crate::ai::VisionService;
use crate::models::{ReferenceImage, StyleTag};
use crate::prompts::style_template;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::info;

pub struct PromptEnhancer {
    vision: Arc<dyn VisionService>,
}

impl PromptEnhancer {
    pub fn new(vision: Arc<dyn VisionService>) -> Self {
        Self { vision }
    }

    /// Produces the final prompt for one generation.
    ///
    /// Fails with [`Error::Validation`] before any remote call when both the
    /// text and the image are missing.
    pub async fn enhance(
        &self,
        prompt: &str,
        reference: Option<&ReferenceImage>,
        style: StyleTag,
    ) -> Result<String> {
        let user_text = prompt.trim();

        let Some(image) = reference else {
            if user_text.is_empty() {
                return Err(Error::Validation(
                    "Enter a prompt or provide a reference image".to_string(),
                ));
            }
            return Ok(user_text.to_string());
        };

        let template = style_template(style);
        info!("Analyzing reference image for {} style", style);

        let description = self
            .vision
            .describe_image(template.describe_instruction, image)
            .await?;
        let base = anchor_opening_phrase(&description, template.opening_phrase)?;

        let final_prompt = if user_text.is_empty() {
            base
        } else {
            format!("{}. Additionally, {}", base.trim_end_matches('.'), user_text)
        };

        info!(
            "Enhanced prompt ({} chars) for {} style",
            final_prompt.len(),
            style
        );
        Ok(final_prompt)
    }
}

/// Strips wrapping quotes from the model's paragraph and makes sure it starts
/// with the style's opening phrase.
fn anchor_opening_phrase(description: &str, opening_phrase: &str) -> Result<String> {
    let text = description
        .trim()
        .trim_matches(|c| c == '"' || c == '\u{201C}' || c == '\u{201D}')
        .trim();

    if text.is_empty() {
        return Err(Error::malformed("Vision model returned an empty description"));
    }

    if text.starts_with(opening_phrase) {
        Ok(text.to_string())
    } else {
        tracing::debug!("Description did not start with the opening phrase, prepending it");
        Ok(format!("{}, {}", opening_phrase, text))
    }
}
