use super::client::VertexHttpClient;
use crate::ai::{OperationHandle, OperationStatus, VideoRequest, VideoService};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct LongRunningRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EncodedMedia>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodedMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_base64_encoded: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gcs_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
    sample_count: u32,
    duration_seconds: u32,
    resolution: String,
    person_generation: String,
    enhance_prompt: bool,
    generate_audio: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchOperationRequest {
    operation_name: String,
}

#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    videos: Vec<EncodedMedia>,
    #[serde(default)]
    rai_media_filtered_reasons: Vec<String>,
}

/// Veo image/text-to-video client.
pub struct VertexVideoClient {
    http: Arc<VertexHttpClient>,
    model: String,
}

impl VertexVideoClient {
    pub fn new(http: Arc<VertexHttpClient>, model: String) -> Self {
        Self { http, model }
    }

    fn into_status(operation: Operation) -> Result<OperationStatus> {
        if let Some(error) = operation.error {
            return Ok(OperationStatus::Failed {
                message: format!("{} (code {})", error.message, error.code),
            });
        }
        if !operation.done {
            return Ok(OperationStatus::Pending);
        }

        let Some(response) = operation.response else {
            return Ok(OperationStatus::Succeeded { video: None });
        };

        if !response.rai_media_filtered_reasons.is_empty() && response.videos.is_empty() {
            return Ok(OperationStatus::Failed {
                message: response.rai_media_filtered_reasons.join("; "),
            });
        }

        let video = match response.videos.into_iter().next() {
            Some(EncodedMedia {
                bytes_base64_encoded: Some(data),
                ..
            }) => {
                use base64::Engine as _;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data.trim())
                    .map_err(|e| Error::malformed(format!("Failed to decode video payload: {}", e)))?;
                // An empty payload is no payload.
                (!bytes.is_empty()).then_some(bytes)
            }
            Some(EncodedMedia {
                gcs_uri: Some(uri), ..
            }) => {
                tracing::warn!(
                    "Video {} was written to {} instead of returned inline",
                    operation.name,
                    uri
                );
                None
            }
            _ => None,
        };

        Ok(OperationStatus::Succeeded { video })
    }
}

#[async_trait]
impl VideoService for VertexVideoClient {
    async fn submit_video(&self, request: &VideoRequest) -> Result<OperationHandle> {
        use base64::Engine as _;
        let image = request.image.as_ref().map(|image| EncodedMedia {
            bytes_base64_encoded: Some(base64::engine::general_purpose::STANDARD.encode(&image.bytes)),
            gcs_uri: None,
            mime_type: Some(image.mime_type.clone()),
        });

        let body = LongRunningRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image,
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.clone(),
                sample_count: request.sample_count,
                duration_seconds: request.duration_seconds,
                resolution: request.resolution.clone(),
                person_generation: request.person_generation.clone(),
                enhance_prompt: request.enhance_prompt,
                generate_audio: request.generate_audio,
            },
        };

        let operation: Operation = self
            .http
            .call(&self.model, "predictLongRunning", &body, Duration::from_secs(60))
            .await?;

        if operation.name.is_empty() {
            return Err(Error::malformed("Video submission returned no operation name"));
        }

        tracing::info!("Submitted video operation {}", operation.name);
        Ok(OperationHandle(operation.name))
    }

    async fn fetch_operation(&self, handle: &OperationHandle) -> Result<OperationStatus> {
        let body = FetchOperationRequest {
            operation_name: handle.0.clone(),
        };

        // Finished operations carry the whole clip inline.
        let operation: Operation = self
            .http
            .call(&self.model, "fetchPredictOperation", &body, Duration::from_secs(300))
            .await?;

        Self::into_status(operation)
    }
}
