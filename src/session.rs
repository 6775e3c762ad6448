//! Session state and the handlers that mutate it
//!
//! [`SessionState`] is owned by one caller and passed explicitly to each
//! [`Studio`] handler. Handlers do all remote work first and only touch the
//! state once everything succeeded, so a failed call leaves the previous
//! state intact.

use crate::ai::{
    ImageEditService, ImageGenerationParams, ImageGenerationService, VideoService, VisionService,
};
use crate::enhance::PromptEnhancer;
use crate::favorites::{FavoriteOutcome, FavoritesCollection};
use crate::models::{Artifact, GenerationRequest, PollSettings, ReferenceImage, StyleTag};
use crate::poller::VideoPoller;
use crate::prompts::{edit_instruction, regeneration_prompt};
use crate::{Error, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_EDIT_LABEL: &str = "Image transformation";

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub current: Option<Artifact>,
    /// Every image from the last generation, in the order the service returned them.
    pub options: Vec<Artifact>,
    pub final_prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub style: StyleTag,
    pub iteration: u32,
    pub current_video: Option<Artifact>,
    pub video_iteration: u32,
    pub edit_iteration: u32,
    pub favorites: FavoritesCollection,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes image `index` of the last generation the current one.
    pub fn select_alternate(&mut self, index: usize) -> Result<&Artifact> {
        let Some(choice) = self.options.get(index) else {
            return Err(Error::Validation(format!(
                "No generated image at position {} ({} available)",
                index,
                self.options.len()
            )));
        };
        self.current = Some(choice.clone());
        info!("Selected image {} of {}", index, self.options.len());
        self.current
            .as_ref()
            .ok_or_else(|| Error::Invariant("current image missing after selection".to_string()))
    }

    pub fn add_current_to_favorites(&mut self) -> Result<FavoriteOutcome> {
        let current = self
            .current
            .clone()
            .ok_or_else(|| Error::Validation("Generate an image first".to_string()))?;
        Ok(self.favorites.append(current))
    }

    pub fn remove_favorite(&mut self, index: usize) -> Result<Artifact> {
        self.favorites.remove_at(index)
    }

    pub fn clear_favorites(&mut self) {
        self.favorites.clear();
    }

    /// Starts over on images. Favorites and the last video are kept.
    pub fn reset(&mut self) {
        self.current = None;
        self.options.clear();
        self.final_prompt = None;
        self.negative_prompt = None;
        self.iteration = 0;
        self.edit_iteration = 0;
        info!("Session reset ({} favorites kept)", self.favorites.len());
    }

    /// The current image, usable as a reference for further generation.
    pub fn current_as_reference(&self) -> Option<ReferenceImage> {
        self.current.as_ref().map(|artifact| ReferenceImage {
            bytes: artifact.media.clone(),
            mime_type: artifact.mime_type.clone(),
        })
    }
}

/// Service handles needed to build a [`Studio`].
pub struct StudioServices {
    pub vision: Arc<dyn VisionService>,
    pub image_gen: Arc<dyn ImageGenerationService>,
    pub image_edit: Arc<dyn ImageEditService>,
    pub video: Arc<dyn VideoService>,
}

pub struct Studio {
    enhancer: PromptEnhancer,
    image_gen: Arc<dyn ImageGenerationService>,
    image_edit: Arc<dyn ImageEditService>,
    video: Arc<dyn VideoService>,
    poll: PollSettings,
}

impl Studio {
    pub fn with_services(services: StudioServices, poll: PollSettings) -> Self {
        Self {
            enhancer: PromptEnhancer::new(services.vision),
            image_gen: services.image_gen,
            image_edit: services.image_edit,
            video: services.video,
            poll,
        }
    }

    /// Enhances the prompt, generates `request.count` images and makes the
    /// first one current. Returns how many images came back.
    pub async fn generate_images(
        &self,
        state: &mut SessionState,
        request: &GenerationRequest,
    ) -> Result<usize> {
        request.validate()?;

        let final_prompt = self
            .enhancer
            .enhance(&request.prompt, request.reference_image.as_ref(), request.style)
            .await?;

        let negative = request.negative_prompt().map(str::to_string);
        let params = ImageGenerationParams {
            prompt: final_prompt.clone(),
            negative_prompt: negative.clone(),
            count: request.count,
            aspect_ratio: request.aspect_ratio.clone(),
        };

        info!("Generating {} image(s) in {} style", request.count, request.style);
        let images = self.image_gen.generate_images(&params).await?;
        if images.is_empty() {
            return Err(Error::malformed("Image generation returned no images"));
        }

        let options: Vec<Artifact> = images
            .into_iter()
            .map(|image| Artifact::image(image, &final_prompt, request.style, 1))
            .collect();
        let count = options.len();

        state.current = options.first().cloned();
        state.options = options;
        state.final_prompt = Some(final_prompt);
        state.negative_prompt = negative;
        state.style = request.style;
        state.iteration = 1;

        info!("Generated {} image(s)", count);
        Ok(count)
    }

    /// Generates one new image from the last final prompt plus `feedback`.
    ///
    /// `style` overrides the session's style for the regeneration directive.
    pub async fn regenerate<'s>(
        &self,
        state: &'s mut SessionState,
        feedback: &str,
        style: Option<StyleTag>,
    ) -> Result<&'s Artifact> {
        let previous = state
            .final_prompt
            .as_deref()
            .ok_or_else(|| Error::Validation("Generate an image before regenerating".to_string()))?;
        if feedback.trim().is_empty() {
            return Err(Error::Validation(
                "Please provide some feedback to improve the image".to_string(),
            ));
        }

        let style = style.unwrap_or(state.style);
        let prompt = regeneration_prompt(previous, feedback, style);
        let params = ImageGenerationParams {
            prompt: prompt.clone(),
            negative_prompt: state.negative_prompt.clone(),
            count: 1,
            aspect_ratio: None,
        };

        let image = self
            .image_gen
            .generate_images(&params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::malformed("Regeneration returned no image"))?;

        let iteration = state.iteration + 1;
        let artifact = Artifact::image(image, &prompt, style, iteration);

        state.options = vec![artifact.clone()];
        state.current = Some(artifact);
        state.final_prompt = Some(prompt);
        state.style = style;
        state.iteration = iteration;

        info!("Regenerated image (iteration {})", iteration);
        state
            .current
            .as_ref()
            .ok_or_else(|| Error::Invariant("current image missing after regeneration".to_string()))
    }

    /// Transforms `source` with the style's edit instruction and makes the
    /// result current.
    ///
    /// When the model answers with text only, the error carries that text
    /// (see [`Error::fallback_text`]).
    pub async fn edit_image<'s>(
        &self,
        state: &'s mut SessionState,
        source: &ReferenceImage,
        instruction: Option<&str>,
        negative: Option<&str>,
        style: StyleTag,
    ) -> Result<&'s Artifact> {
        if !crate::image::is_valid_image(&source.bytes) {
            return Err(Error::Validation(
                "The source image could not be read".to_string(),
            ));
        }

        let full_instruction = edit_instruction(style, instruction, negative);
        info!("Editing image in {} style", style);
        let image = self.image_edit.edit_image(source, &full_instruction).await?;

        let label = instruction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_EDIT_LABEL);
        let iteration = state.edit_iteration + 1;
        let artifact = Artifact::image(image, &format!("Edit: {}", label), style, iteration);

        state.options = vec![artifact.clone()];
        state.current = Some(artifact);
        state.edit_iteration = iteration;

        info!("Edited image (iteration {})", iteration);
        state
            .current
            .as_ref()
            .ok_or_else(|| Error::Invariant("current image missing after edit".to_string()))
    }

    /// Runs a video job to completion and stores the clip as the current video.
    pub async fn generate_video<'s>(
        &self,
        state: &'s mut SessionState,
        prompt: &str,
        reference: Option<&ReferenceImage>,
        cancel: &CancellationToken,
    ) -> Result<&'s Artifact> {
        let poller = VideoPoller::new(self.video.as_ref(), self.poll.clone(), cancel.clone());
        let bytes = poller.run(prompt, reference).await.into_result()?;

        let iteration = state.video_iteration + 1;
        state.current_video = Some(Artifact::video(bytes, prompt.trim(), state.style, iteration));
        state.video_iteration = iteration;

        state
            .current_video
            .as_ref()
            .ok_or_else(|| Error::Invariant("video missing after generation".to_string()))
    }
}
