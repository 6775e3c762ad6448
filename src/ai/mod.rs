//! Generative AI service integration
//!
//! Traits for the four remote capabilities the studio relies on (image
//! description, image generation, image editing and video generation), with
//! Vertex AI implementations and in-memory mocks.

pub mod mime;
pub mod mock;
pub mod vertex;

pub use mock::{MockImageEditClient, MockImageGenerationClient, MockVideoClient, MockVisionClient};
pub use vertex::{
    VertexHttpClient, VertexImageEditClient, VertexImagenClient, VertexVideoClient,
    VertexVisionClient,
};

use crate::models::{GeneratedImage, ReferenceImage};
use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// Payload for a text-to-image call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationParams {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub count: u8,
    pub aspect_ratio: Option<String>,
}

/// Payload for a video job. [`Default`] carries the fixed studio options.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRequest {
    pub prompt: String,
    pub image: Option<ReferenceImage>,
    pub aspect_ratio: String,
    pub sample_count: u32,
    pub duration_seconds: u32,
    pub resolution: String,
    pub person_generation: String,
    pub enhance_prompt: bool,
    pub generate_audio: bool,
}

impl Default for VideoRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            image: None,
            aspect_ratio: "16:9".to_string(),
            sample_count: 1,
            duration_seconds: 8,
            resolution: "1080p".to_string(),
            person_generation: "allow_adult".to_string(),
            enhance_prompt: true,
            generate_audio: true,
        }
    }
}

/// Opaque name of a remote long-running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(pub String);

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a video operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    Pending,
    /// Finished. `video` is the first generated clip, if the service sent one.
    Succeeded { video: Option<Vec<u8>> },
    Failed { message: String },
}

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Describes `image` following `instruction`; returns the model's text.
    async fn describe_image(&self, instruction: &str, image: &ReferenceImage) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_images(&self, params: &ImageGenerationParams) -> Result<Vec<GeneratedImage>>;
}

#[async_trait]
pub trait ImageEditService: Send + Sync {
    async fn edit_image(&self, source: &ReferenceImage, instruction: &str) -> Result<GeneratedImage>;
}

#[async_trait]
pub trait VideoService: Send + Sync {
    async fn submit_video(&self, request: &VideoRequest) -> Result<OperationHandle>;
    async fn fetch_operation(&self, handle: &OperationHandle) -> Result<OperationStatus>;
}
