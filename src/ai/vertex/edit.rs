use super::client::VertexHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
    SafetySetting,
};
use crate::ai::ImageEditService;
use crate::image::is_valid_image;
use crate::models::{GeneratedImage, ReferenceImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Image-capable Gemini model used to transform an uploaded image.
pub struct VertexImageEditClient {
    http: Arc<VertexHttpClient>,
    model: String,
}

impl VertexImageEditClient {
    pub fn new(http: Arc<VertexHttpClient>, model: String) -> Self {
        Self { http, model }
    }

    fn generation_config() -> GenerationConfig {
        GenerationConfig {
            temperature: Some(0.3),
            top_p: Some(0.95),
            top_k: Some(40),
            max_output_tokens: Some(8192),
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        }
    }

    fn safety_settings() -> Vec<SafetySetting> {
        vec![SafetySetting {
            category: "HARM_CATEGORY_CIVIC_INTEGRITY".to_string(),
            threshold: "OFF".to_string(),
        }]
    }
}

/// Decodes an inline image payload, unwrapping one extra base64 layer when
/// the first decode does not yield a readable image.
fn decode_inline_image(inline: &InlineData) -> Option<Vec<u8>> {
    use base64::Engine as _;
    let engine = base64::engine::general_purpose::STANDARD;

    let first = engine.decode(inline.data.trim()).ok()?;
    if is_valid_image(&first) {
        return Some(first);
    }

    let nested = std::str::from_utf8(&first).ok()?;
    let second = engine.decode(nested.trim()).ok()?;
    is_valid_image(&second).then_some(second)
}

#[async_trait]
impl ImageEditService for VertexImageEditClient {
    async fn edit_image(&self, source: &ReferenceImage, instruction: &str) -> Result<GeneratedImage> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline(source.mime_type.clone(), &source.bytes),
                Part::text(instruction),
            ])],
            generation_config: Some(Self::generation_config()),
            safety_settings: Self::safety_settings(),
        };

        let response: GenerateContentResponse = self
            .http
            .call(&self.model, "generateContent", &request, Duration::from_secs(120))
            .await?;

        // The last inline payload wins when a model streams several drafts.
        let inline = response
            .parts()
            .filter_map(|p| match p {
                Part::InlineData { inline_data } => Some(inline_data),
                _ => None,
            })
            .last();
        let texts = response.texts();
        let text = (!texts.is_empty()).then(|| texts.join("\n"));

        let Some(inline) = inline else {
            tracing::warn!("Image edit response carried no image data");
            return Err(Error::MalformedResponse {
                message: "The model did not return an image".to_string(),
                text,
            });
        };

        match decode_inline_image(inline) {
            Some(bytes) => {
                tracing::debug!(
                    "Image edit returned {} bytes ({})",
                    bytes.len(),
                    inline.mime_type
                );
                Ok(GeneratedImage {
                    bytes,
                    mime_type: inline.mime_type.clone(),
                })
            }
            None => {
                tracing::warn!("Image edit payload could not be decoded as an image");
                Err(Error::MalformedResponse {
                    message: "Received bytes could not be decoded as an image".to_string(),
                    text,
                })
            }
        }
    }
}
