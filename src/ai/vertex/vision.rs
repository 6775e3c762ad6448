use super::client::VertexHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::ai::VisionService;
use crate::models::ReferenceImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Text+vision model used to turn a reference image into a prompt.
pub struct VertexVisionClient {
    http: Arc<VertexHttpClient>,
    model: String,
}

impl VertexVisionClient {
    pub fn new(http: Arc<VertexHttpClient>, model: String) -> Self {
        Self { http, model }
    }
}

#[async_trait]
impl VisionService for VertexVisionClient {
    async fn describe_image(&self, instruction: &str, image: &ReferenceImage) -> Result<String> {
        tracing::debug!(
            "Describing reference image ({} bytes, {}) via {}",
            image.bytes.len(),
            image.mime_type,
            self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::text(instruction),
                Part::inline(image.mime_type.clone(), &image.bytes),
            ])],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(2048),
                ..Default::default()
            }),
            safety_settings: Vec::new(),
        };

        let response: GenerateContentResponse = self
            .http
            .call(&self.model, "generateContent", &request, Duration::from_secs(60))
            .await?;

        let text = response.texts().concat();
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::malformed("No text in vision model response"));
        }

        Ok(text.to_string())
    }
}
