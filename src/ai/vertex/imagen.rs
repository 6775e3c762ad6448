use super::client::VertexHttpClient;
use crate::ai::{ImageGenerationParams, ImageGenerationService};
use crate::models::GeneratedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    add_watermark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// One generated image, or a filtered slot explaining why it was dropped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
    rai_filtered_reason: Option<String>,
}

/// Imagen text-to-image client.
pub struct VertexImagenClient {
    http: Arc<VertexHttpClient>,
    model: String,
}

impl VertexImagenClient {
    pub fn new(http: Arc<VertexHttpClient>, model: String) -> Self {
        Self { http, model }
    }
}

#[async_trait]
impl ImageGenerationService for VertexImagenClient {
    async fn generate_images(&self, params: &ImageGenerationParams) -> Result<Vec<GeneratedImage>> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: params.prompt.clone(),
            }],
            parameters: PredictParameters {
                sample_count: params.count,
                negative_prompt: params.negative_prompt.clone(),
                add_watermark: false,
                aspect_ratio: params.aspect_ratio.clone(),
            },
        };

        let response: PredictResponse = self
            .http
            .call(&self.model, "predict", &request, Duration::from_secs(120))
            .await?;

        use base64::Engine as _;
        let mut images = Vec::new();
        let mut filtered = Vec::new();
        for prediction in response.predictions {
            match prediction.bytes_base64_encoded {
                Some(data) => {
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(&data)
                        .map_err(|e| {
                            Error::malformed(format!("Failed to decode Imagen base64 image: {}", e))
                        })?;
                    let mime_type = prediction
                        .mime_type
                        .unwrap_or_else(|| crate::ai::mime::detect_image_mime(&bytes).to_string());
                    images.push(GeneratedImage { bytes, mime_type });
                }
                None => {
                    if let Some(reason) = prediction.rai_filtered_reason {
                        filtered.push(reason);
                    }
                }
            }
        }

        if images.is_empty() {
            return Err(Error::MalformedResponse {
                message: "No images were generated by the model".to_string(),
                text: (!filtered.is_empty()).then(|| filtered.join("\n")),
            });
        }

        tracing::info!(
            "Imagen returned {} image(s) ({} requested)",
            images.len(),
            params.count
        );
        Ok(images)
    }
}
