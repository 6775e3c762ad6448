use super::{
    ImageEditService, ImageGenerationParams, ImageGenerationService, OperationHandle,
    OperationStatus, VideoRequest, VideoService, VisionService,
};
use crate::models::{GeneratedImage, ReferenceImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Smallest valid PNG (1x1).
pub const TINY_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

fn tiny_png_image() -> GeneratedImage {
    GeneratedImage {
        bytes: TINY_PNG.to_vec(),
        mime_type: "image/png".to_string(),
    }
}

#[derive(Clone, Default)]
pub struct MockVisionClient {
    responses: Arc<Mutex<Vec<String>>>,
    fail_with: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    instructions: Arc<Mutex<Vec<String>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Instructions received so far, in call order.
    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn describe_image(&self, instruction: &str, _image: &ReferenceImage) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());

        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("A product photographed on a plain background".to_string())
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[derive(Clone, Default)]
pub struct MockImageGenerationClient {
    image_responses: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_with: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<ImageGenerationParams>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images returned in order, cycling, one per requested sample.
    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_request(&self) -> Option<ImageGenerationParams> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_images(&self, params: &ImageGenerationParams) -> Result<Vec<GeneratedImage>> {
        *self.call_count.lock().unwrap() += 1;
        self.requests.lock().unwrap().push(params.clone());

        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.image_responses.lock().unwrap();
        Ok((0..params.count as usize)
            .map(|i| {
                if responses.is_empty() {
                    tiny_png_image()
                } else {
                    let bytes = responses[i % responses.len()].clone();
                    GeneratedImage {
                        mime_type: crate::ai::mime::detect_image_mime(&bytes).to_string(),
                        bytes,
                    }
                }
            })
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MockImageEditClient {
    text_only: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    instructions: Arc<Mutex<Vec<String>>>,
}

impl MockImageEditClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call answer with text and no image.
    pub fn with_text_only_response(self, text: &str) -> Self {
        *self.text_only.lock().unwrap() = Some(text.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageEditService for MockImageEditClient {
    async fn edit_image(&self, _source: &ReferenceImage, instruction: &str) -> Result<GeneratedImage> {
        *self.call_count.lock().unwrap() += 1;
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());

        if let Some(text) = self.text_only.lock().unwrap().clone() {
            return Err(Error::MalformedResponse {
                message: "The model did not return an image".to_string(),
                text: Some(text),
            });
        }

        Ok(tiny_png_image())
    }
}

/// Video service that replays a scripted sequence of operation statuses.
///
/// Once the script runs out, every further fetch reports `Pending`.
#[derive(Clone, Default)]
pub struct MockVideoClient {
    statuses: Arc<Mutex<VecDeque<Result<OperationStatus>>>>,
    submit_failure: Arc<Mutex<Option<String>>>,
    submit_count: Arc<Mutex<usize>>,
    fetch_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<VideoRequest>>>,
}

impl MockVideoClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(self, status: OperationStatus) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(status));
        self
    }

    pub fn with_fetch_error(self, message: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Err(Error::AiProvider(message.to_string())));
        self
    }

    pub fn with_submit_failure(self, message: &str) -> Self {
        *self.submit_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_submit_count(&self) -> usize {
        *self.submit_count.lock().unwrap()
    }

    pub fn get_fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }

    pub fn last_request(&self) -> Option<VideoRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl VideoService for MockVideoClient {
    async fn submit_video(&self, request: &VideoRequest) -> Result<OperationHandle> {
        *self.submit_count.lock().unwrap() += 1;
        self.requests.lock().unwrap().push(request.clone());

        if let Some(message) = self.submit_failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        Ok(OperationHandle("operations/mock-video".to_string()))
    }

    async fn fetch_operation(&self, _handle: &OperationHandle) -> Result<OperationStatus> {
        *self.fetch_count.lock().unwrap() += 1;
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(OperationStatus::Pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceImage {
        ReferenceImage::from_bytes(TINY_PNG.to_vec())
    }

    #[test]
    fn test_tiny_png_is_valid() {
        assert!(crate::image::is_valid_image(&TINY_PNG));
    }

    #[tokio::test]
    async fn test_mock_vision_cycles_descriptions() {
        let client = MockVisionClient::new()
            .with_description("first".to_string())
            .with_description("second".to_string());

        assert_eq!(client.describe_image("i", &reference()).await.unwrap(), "first");
        assert_eq!(client.describe_image("i", &reference()).await.unwrap(), "second");
        // Should cycle back
        assert_eq!(client.describe_image("i", &reference()).await.unwrap(), "first");
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_image_generation_returns_requested_count() {
        let client = MockImageGenerationClient::new();
        let params = ImageGenerationParams {
            prompt: "p".to_string(),
            negative_prompt: None,
            count: 3,
            aspect_ratio: None,
        };

        let images = client.generate_images(&params).await.unwrap();
        assert_eq!(images.len(), 3);
        assert_eq!(client.last_request(), Some(params));
    }

    #[tokio::test]
    async fn test_mock_video_replays_script_then_pends() {
        let client = MockVideoClient::new()
            .with_status(OperationStatus::Pending)
            .with_status(OperationStatus::Succeeded { video: None });
        let handle = client.submit_video(&VideoRequest::default()).await.unwrap();

        assert_eq!(client.fetch_operation(&handle).await.unwrap(), OperationStatus::Pending);
        assert_eq!(
            client.fetch_operation(&handle).await.unwrap(),
            OperationStatus::Succeeded { video: None }
        );
        assert_eq!(client.fetch_operation(&handle).await.unwrap(), OperationStatus::Pending);
        assert_eq!(client.get_fetch_count(), 3);
    }
}
