//! Application orchestration for the interactive studio and one-shot runs.

use crate::ai::{
    VertexHttpClient, VertexImageEditClient, VertexImagenClient, VertexVideoClient,
    VertexVisionClient,
};
use crate::favorites::FavoriteOutcome;
use crate::image::{downscale_for_display, export_artifact, is_valid_image, DISPLAY_WIDTH};
use crate::models::{
    Artifact, Config, GeneratedImage, GenerationRequest, MediaKind, PollSettings, ReferenceImage,
    StyleTag,
};
use crate::prompts::style_template;
use crate::session::{SessionState, Studio, StudioServices};
use crate::shell::{Command, ImageSource, SaveTarget, HELP};
use crate::{Error, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const FAVORITE_PROMPT_PREVIEW: usize = 150;

/// Settings applied to the next generation, as typed into the shell.
#[derive(Debug, Clone)]
pub struct FormState {
    pub style: StyleTag,
    pub negative: Option<String>,
    pub count: u8,
    pub aspect_ratio: Option<String>,
    pub reference: Option<ReferenceImage>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            style: StyleTag::default(),
            negative: None,
            count: 1,
            aspect_ratio: None,
            reference: None,
        }
    }
}

/// Coordinates the studio handlers, the session and local output.
pub struct App {
    studio: Studio,
    state: SessionState,
    form: FormState,
    output_dir: PathBuf,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: StudioServices, poll: PollSettings, output_dir: PathBuf) -> Self {
        Self {
            studio: Studio::with_services(services, poll),
            state: SessionState::new(),
            form: FormState::default(),
            output_dir,
        }
    }

    /// Authenticate once and wire every Vertex client to the shared connection.
    pub async fn new(config: &Config) -> Result<Self> {
        let http = Arc::new(VertexHttpClient::connect(config).await?);
        info!(
            "Connected to Vertex AI (project: {}, location: {})",
            http.project_id(),
            config.location
        );
        info!(
            "Models: vision={} image={} edit={} video={}",
            config.vision_model, config.imagen_model, config.edit_model, config.video_model
        );

        let services = StudioServices {
            vision: Arc::new(VertexVisionClient::new(http.clone(), config.vision_model.clone())),
            image_gen: Arc::new(VertexImagenClient::new(http.clone(), config.imagen_model.clone())),
            image_edit: Arc::new(VertexImageEditClient::new(http.clone(), config.edit_model.clone())),
            video: Arc::new(VertexVideoClient::new(http, config.video_model.clone())),
        };

        Ok(Self::with_services(
            services,
            config.poll.clone(),
            config.output_dir.clone(),
        ))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Read commands from stdin until `quit`, end of input, or Ctrl-C at
    /// the prompt.
    pub async fn run_shell(&mut self) -> Result<()> {
        println!("Product studio. Type 'help' for commands.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let quit = CancellationToken::new();
        let (running_tx, running_rx) = watch::channel(None);
        let interrupts = tokio::spawn(watch_interrupts(running_rx, quit.clone()));

        loop {
            print!("studio [{}]> ", self.form.style);
            std::io::stdout().flush()?;

            let line = tokio::select! {
                _ = quit.cancelled() => {
                    println!();
                    break;
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => command,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            let cancel = CancellationToken::new();
            running_tx.send_replace(Some(cancel.clone()));
            let result = self.execute(command, &cancel).await;
            running_tx.send_replace(None);

            match result {
                Ok(messages) => {
                    for message in messages {
                        println!("{}", message);
                    }
                }
                Err(e) => {
                    error!("Command failed: {}", e);
                    println!("{}", e);
                    if let Some(text) = e.fallback_text() {
                        println!("Model response: {}", text);
                    }
                }
            }
        }

        interrupts.abort();
        info!("Leaving studio ({} favorites)", self.state.favorites.len());
        Ok(())
    }

    /// Apply one command and return the lines to show the user.
    pub async fn execute(&mut self, command: Command, cancel: &CancellationToken) -> Result<Vec<String>> {
        match command {
            Command::Style(style) => {
                self.form.style = style;
                let template = style_template(style);
                Ok(vec![format!("Style: {}. {}", template.label, template.summary)])
            }
            Command::Negative(negative) => {
                let message = match &negative {
                    Some(text) => format!("Avoiding: {}", text),
                    None => "Negative prompt cleared".to_string(),
                };
                self.form.negative = negative;
                Ok(vec![message])
            }
            Command::Count(count) => {
                self.form.count = count;
                Ok(vec![format!("Generating {} image(s) per request", count)])
            }
            Command::AspectRatio(ratio) => {
                let message = match &ratio {
                    Some(ratio) => format!("Aspect ratio: {}", ratio),
                    None => "Aspect ratio cleared (model default)".to_string(),
                };
                self.form.aspect_ratio = ratio;
                Ok(vec![message])
            }
            Command::Reference(Some(path)) => {
                let image = read_image(&path).await?;
                self.form.reference = Some(image);
                Ok(vec![format!("Reference image: {}", path.display())])
            }
            Command::Reference(None) => {
                self.form.reference = None;
                Ok(vec!["Reference image cleared".to_string()])
            }
            Command::Generate(prompt) => self.generate(prompt).await,
            Command::Select(index) => {
                self.state.select_alternate(index)?;
                Ok(vec![format!("Image {} is now current", index + 1)])
            }
            Command::Regenerate(feedback) => {
                let artifact = self
                    .studio
                    .regenerate(&mut self.state, &feedback, Some(self.form.style))
                    .await?;
                Ok(vec![format!(
                    "Image regenerated successfully (iteration #{})",
                    artifact.iteration
                )])
            }
            Command::Edit {
                source,
                instruction,
            } => {
                let source = self.resolve_source(&source).await?;
                let artifact = self
                    .studio
                    .edit_image(
                        &mut self.state,
                        &source,
                        instruction.as_deref(),
                        self.form.negative.as_deref(),
                        self.form.style,
                    )
                    .await?;
                Ok(vec![format!(
                    "Image edited successfully (iteration #{}). Use 'fav' or 'save current' to keep it",
                    artifact.iteration
                )])
            }
            Command::Video { source, prompt } => {
                let reference = match &source {
                    Some(source) => Some(self.resolve_source(source).await?),
                    None => None,
                };
                info!("Generating video, this may take several minutes (Ctrl-C stops waiting)");
                let video = self
                    .studio
                    .generate_video(&mut self.state, &prompt, reference.as_ref(), cancel)
                    .await?;
                Ok(vec![format!(
                    "Video generated successfully ({} bytes). Use 'save video' to write it",
                    video.media.len()
                )])
            }
            Command::Favorite => match self.state.add_current_to_favorites()? {
                FavoriteOutcome::Added => Ok(vec!["Image added to favorites".to_string()]),
                FavoriteOutcome::Duplicate => {
                    Ok(vec!["This image is already in your favorites".to_string()])
                }
            },
            Command::ListFavorites => Ok(self.favorite_lines()),
            Command::Unfavorite(index) => {
                let removed = self.state.remove_favorite(index)?;
                Ok(vec![
                    format!(
                        "Removed favorite {} ({} left)",
                        index + 1,
                        self.state.favorites.len()
                    ),
                    format!("Prompt: {}", preview(&removed.source_prompt)),
                ])
            }
            Command::ClearFavorites => {
                self.state.clear_favorites();
                Ok(vec!["All favorites cleared".to_string()])
            }
            Command::Save { target, path } => {
                let artifact = self.save_target(target)?;
                let (dir, stem) = match path {
                    Some(path) => split_destination(&path)?,
                    None => (self.output_dir.clone(), default_stem(artifact)),
                };
                let saved = export_artifact(artifact, &dir, &stem).await?;
                Ok(vec![format!("Saved to {}", saved.display())])
            }
            Command::Thumbnail { target, path } => {
                let artifact = self.save_target(target)?;
                let (dir, stem) = match path {
                    Some(path) => split_destination(&path)?,
                    None => (self.output_dir.clone(), format!("{}_thumb", default_stem(artifact))),
                };
                let preview = display_copy(artifact).await?;
                let saved = export_artifact(&preview, &dir, &stem).await?;
                Ok(vec![format!("Preview saved to {}", saved.display())])
            }
            Command::Reset => {
                self.state.reset();
                Ok(vec!["Started over. Favorites were kept".to_string()])
            }
            Command::Help => Ok(HELP.lines().map(str::to_string).collect()),
            Command::Quit => Ok(Vec::new()),
        }
    }

    async fn generate(&mut self, prompt: String) -> Result<Vec<String>> {
        let mut request = GenerationRequest::new(prompt, self.form.style).with_count(self.form.count);
        request.negative_prompt = self.form.negative.clone();
        request.aspect_ratio = self.form.aspect_ratio.clone();
        request.reference_image = self.form.reference.clone();

        let count = self.studio.generate_images(&mut self.state, &request).await?;

        let mut lines = vec![format!(
            "{} image(s) generated (iteration #{})",
            count, self.state.iteration
        )];
        if let Some(prompt) = &self.state.final_prompt {
            lines.push(format!("Final prompt: {}", prompt));
        }
        if count > 1 {
            lines.push(format!(
                "Image 1 is current. Use 'select <1-{}>' to pick another",
                count
            ));
        }
        Ok(lines)
    }

    /// Generate images once and write every result to the output directory.
    pub async fn generate_once(&mut self, request: &GenerationRequest) -> Result<Vec<PathBuf>> {
        self.studio.generate_images(&mut self.state, request).await?;

        let mut paths = Vec::with_capacity(self.state.options.len());
        for (i, artifact) in self.state.options.iter().enumerate() {
            let stem = format!("{}_{}", default_stem(artifact), i + 1);
            paths.push(export_artifact(artifact, &self.output_dir, &stem).await?);
        }
        Ok(paths)
    }

    /// Edit the image at `source` once and write the result.
    pub async fn edit_once(
        &mut self,
        source: &Path,
        instruction: Option<&str>,
        negative: Option<&str>,
        style: StyleTag,
    ) -> Result<PathBuf> {
        let image = read_image(source).await?;
        let artifact = self
            .studio
            .edit_image(&mut self.state, &image, instruction, negative, style)
            .await?;
        export_artifact(artifact, &self.output_dir, &default_stem(artifact)).await
    }

    /// Generate one video, waiting until done or `cancel` fires, and write it.
    pub async fn video_once(
        &mut self,
        prompt: &str,
        reference: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let image = match reference {
            Some(path) => Some(read_image(path).await?),
            None => None,
        };
        let video = self
            .studio
            .generate_video(&mut self.state, prompt, image.as_ref(), cancel)
            .await?;
        export_artifact(video, &self.output_dir, &default_stem(video)).await
    }

    async fn resolve_source(&self, source: &ImageSource) -> Result<ReferenceImage> {
        match source {
            ImageSource::Current => self
                .state
                .current_as_reference()
                .ok_or_else(|| Error::Validation("No current image. Generate one first".to_string())),
            ImageSource::Path(path) => read_image(path).await,
        }
    }

    fn save_target(&self, target: SaveTarget) -> Result<&Artifact> {
        match target {
            SaveTarget::Current => self
                .state
                .current
                .as_ref()
                .ok_or_else(|| Error::Validation("No current image to save".to_string())),
            SaveTarget::Video => self
                .state
                .current_video
                .as_ref()
                .ok_or_else(|| Error::Validation("No video to save".to_string())),
            SaveTarget::Favorite(index) => self.state.favorites.get(index).ok_or_else(|| {
                Error::Validation(format!(
                    "No favorite at position {} ({} saved)",
                    index + 1,
                    self.state.favorites.len()
                ))
            }),
        }
    }

    fn favorite_lines(&self) -> Vec<String> {
        if self.state.favorites.is_empty() {
            return vec!["No favorites yet. Generate an image and use 'fav' to save it".to_string()];
        }

        let mut lines = vec![format!("Saved images ({})", self.state.favorites.len())];
        for (i, favorite) in self.state.favorites.iter().enumerate() {
            lines.push(format!(
                "{}. [{}] iteration #{} {} - {}",
                i + 1,
                style_template(favorite.style).label,
                favorite.iteration,
                favorite.created_at.format("%Y-%m-%d %H:%M:%S"),
                preview(&favorite.source_prompt)
            ));
        }
        lines
    }
}

/// Reads an image file, rejecting anything that does not decode.
pub async fn read_image(path: &Path) -> Result<ReferenceImage> {
    let bytes = tokio::fs::read(path).await?;
    if !is_valid_image(&bytes) {
        return Err(Error::Validation(format!(
            "{} is not a readable PNG, JPEG or WebP image",
            path.display()
        )));
    }
    Ok(ReferenceImage::from_bytes(bytes))
}

/// Routes each Ctrl-C to the running command, or ends the shell when idle.
async fn watch_interrupts(running: watch::Receiver<Option<CancellationToken>>, quit: CancellationToken) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if !route_interrupt(&running, &quit) {
            break;
        }
    }
}

/// Returns false once the shell has been told to quit.
fn route_interrupt(running: &watch::Receiver<Option<CancellationToken>>, quit: &CancellationToken) -> bool {
    match running.borrow().as_ref() {
        Some(command) => {
            info!("Interrupt received, stopping the running command");
            command.cancel();
            true
        }
        None => {
            quit.cancel();
            false
        }
    }
}

/// Downscaled PNG copy of an image artifact, keeping its provenance.
async fn display_copy(artifact: &Artifact) -> Result<Artifact> {
    if artifact.kind != MediaKind::Image {
        return Err(Error::Validation("Previews are only available for images".to_string()));
    }
    let bytes = downscale_for_display(&artifact.media, DISPLAY_WIDTH).await?;
    Ok(Artifact::image(
        GeneratedImage {
            bytes,
            mime_type: "image/png".to_string(),
        },
        &artifact.source_prompt,
        artifact.style,
        artifact.iteration,
    ))
}

fn default_stem(artifact: &Artifact) -> String {
    format!(
        "{}_{}",
        artifact.created_at.format("%Y%m%d_%H%M%S"),
        artifact.id.simple()
    )
}

/// Splits a user-supplied destination into its directory and file stem.
fn split_destination(path: &Path) -> Result<(PathBuf, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation(format!("Invalid destination: {}", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, stem.to_string()))
}

fn preview(prompt: &str) -> String {
    if prompt.chars().count() <= FAVORITE_PROMPT_PREVIEW {
        prompt.to_string()
    } else {
        let short: String = prompt.chars().take(FAVORITE_PROMPT_PREVIEW).collect();
        format!("{}...", short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{
        MockImageEditClient, MockImageGenerationClient, MockVideoClient, MockVisionClient,
        OperationStatus,
    };
    use std::time::Duration;
    use tempfile::tempdir;

    fn build_test_app(output_dir: &Path, edit: MockImageEditClient, video: MockVideoClient) -> App {
        App::with_services(
            StudioServices {
                vision: Arc::new(MockVisionClient::new()),
                image_gen: Arc::new(MockImageGenerationClient::new()),
                image_edit: Arc::new(edit),
                video: Arc::new(video),
            },
            PollSettings {
                interval: Duration::from_millis(1),
                max_polls: Some(3),
            },
            output_dir.to_path_buf(),
        )
    }

    async fn run(app: &mut App, line: &str) -> Result<Vec<String>> {
        let command = Command::parse(line)?;
        app.execute(command, &CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_shell_flow_generate_select_favorite_save() {
        let dir = tempdir().unwrap();
        let mut app = build_test_app(dir.path(), MockImageEditClient::new(), MockVideoClient::new());

        run(&mut app, "style lifestyle").await.unwrap();
        run(&mut app, "count 3").await.unwrap();
        let lines = run(&mut app, "generate a linen tote bag").await.unwrap();
        assert!(lines[0].starts_with("3 image(s) generated"));

        run(&mut app, "select 2").await.unwrap();
        assert_eq!(
            app.state().current.as_ref().unwrap().id,
            app.state().options[1].id
        );

        assert_eq!(
            run(&mut app, "fav").await.unwrap(),
            vec!["Image added to favorites".to_string()]
        );
        assert_eq!(
            run(&mut app, "fav").await.unwrap(),
            vec!["This image is already in your favorites".to_string()]
        );

        let target = dir.path().join("exports").join("tote.png");
        let lines = run(&mut app, &format!("save 1 {}", target.display()))
            .await
            .unwrap();
        assert!(lines[0].starts_with("Saved to"));
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_form_settings_flow_into_request() {
        let dir = tempdir().unwrap();
        let mut app = build_test_app(dir.path(), MockImageEditClient::new(), MockVideoClient::new());

        run(&mut app, "negative text, watermark").await.unwrap();
        run(&mut app, "generate a desk lamp").await.unwrap();

        assert_eq!(app.state().negative_prompt.as_deref(), Some("text, watermark"));
        assert_eq!(app.form().count, 1);
        assert_eq!(app.state().options.len(), 1);
    }

    #[tokio::test]
    async fn test_reference_must_be_an_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();
        let mut app = build_test_app(dir.path(), MockImageEditClient::new(), MockVideoClient::new());

        let err = run(&mut app, &format!("ref {}", path.display()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(app.form().reference.is_none());
    }

    #[tokio::test]
    async fn test_edit_current_requires_an_image() {
        let dir = tempdir().unwrap();
        let mut app = build_test_app(dir.path(), MockImageEditClient::new(), MockVideoClient::new());

        assert!(matches!(
            run(&mut app, "edit current brighter").await,
            Err(Error::Validation(_))
        ));

        run(&mut app, "generate a vase").await.unwrap();
        let lines = run(&mut app, "edit current brighter").await.unwrap();
        assert!(lines[0].starts_with("Image edited successfully"));
        assert_eq!(
            app.state().current.as_ref().unwrap().source_prompt,
            "Edit: brighter"
        );
    }

    #[tokio::test]
    async fn test_edit_text_reply_is_kept_on_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("shoe.png");
        std::fs::write(&source, crate::image::test_png()).unwrap();
        let mut app = build_test_app(
            dir.path(),
            MockImageEditClient::new().with_text_only_response("Sorry, I can only describe it"),
            MockVideoClient::new(),
        );

        let err = run(&mut app, &format!("edit {}", source.display()))
            .await
            .unwrap_err();
        assert_eq!(err.fallback_text(), Some("Sorry, I can only describe it"));
    }

    #[tokio::test]
    async fn test_video_then_save() {
        let dir = tempdir().unwrap();
        let video = MockVideoClient::new().with_status(OperationStatus::Succeeded {
            video: Some(vec![0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p']),
        });
        let mut app = build_test_app(dir.path(), MockImageEditClient::new(), video);

        assert!(matches!(
            run(&mut app, "save video").await,
            Err(Error::Validation(_))
        ));

        run(&mut app, "video slow orbit").await.unwrap();
        let lines = run(&mut app, "save video").await.unwrap();
        assert!(lines[0].ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_list_and_remove_favorites() {
        let dir = tempdir().unwrap();
        let mut app = build_test_app(dir.path(), MockImageEditClient::new(), MockVideoClient::new());

        assert_eq!(run(&mut app, "favs").await.unwrap().len(), 1);
        run(&mut app, "generate a wool scarf").await.unwrap();
        run(&mut app, "fav").await.unwrap();

        let lines = run(&mut app, "favs").await.unwrap();
        assert_eq!(lines[0], "Saved images (1)");
        assert!(lines[1].contains("a wool scarf"));

        run(&mut app, "unfav 1").await.unwrap();
        assert!(app.state().favorites.is_empty());
        assert!(run(&mut app, "unfav 1").await.is_err());
    }

    #[tokio::test]
    async fn test_generate_once_writes_every_option() {
        let dir = tempdir().unwrap();
        let mut app = build_test_app(dir.path(), MockImageEditClient::new(), MockVideoClient::new());

        let request = GenerationRequest::new("a leather wallet", StyleTag::Ecommerce).with_count(2);
        let paths = app.generate_once(&request).await.unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[tokio::test]
    async fn test_aspect_ratio_flows_into_request() {
        let dir = tempdir().unwrap();
        let image_gen = MockImageGenerationClient::new();
        let mut app = App::with_services(
            StudioServices {
                vision: Arc::new(MockVisionClient::new()),
                image_gen: Arc::new(image_gen.clone()),
                image_edit: Arc::new(MockImageEditClient::new()),
                video: Arc::new(MockVideoClient::new()),
            },
            PollSettings::default(),
            dir.path().to_path_buf(),
        );

        run(&mut app, "aspect 9:16").await.unwrap();
        run(&mut app, "generate a perfume bottle").await.unwrap();
        assert_eq!(
            image_gen.last_request().unwrap().aspect_ratio.as_deref(),
            Some("9:16")
        );

        run(&mut app, "aspect clear").await.unwrap();
        run(&mut app, "generate a perfume bottle").await.unwrap();
        assert_eq!(image_gen.last_request().unwrap().aspect_ratio, None);
    }

    #[tokio::test]
    async fn test_thumbnail_is_downscaled_copy() {
        let dir = tempdir().unwrap();
        let wide = image::RgbImage::from_pixel(1600, 800, image::Rgb([0, 120, 200]));
        let mut bytes = Vec::new();
        wide.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let mut app = App::with_services(
            StudioServices {
                vision: Arc::new(MockVisionClient::new()),
                image_gen: Arc::new(MockImageGenerationClient::new().with_image_response(bytes)),
                image_edit: Arc::new(MockImageEditClient::new()),
                video: Arc::new(MockVideoClient::new()),
            },
            PollSettings::default(),
            dir.path().to_path_buf(),
        );

        assert!(matches!(
            run(&mut app, "thumb current").await,
            Err(Error::Validation(_))
        ));

        run(&mut app, "generate a canvas backpack").await.unwrap();
        let target = dir.path().join("preview.png");
        let lines = run(&mut app, &format!("thumb current {}", target.display()))
            .await
            .unwrap();
        assert!(lines[0].starts_with("Preview saved to"));

        let saved = image::open(&target).unwrap();
        assert_eq!((saved.width(), saved.height()), (DISPLAY_WIDTH, 320));
        // The session keeps the full-size image.
        let current = image::load_from_memory(&app.state().current.as_ref().unwrap().media).unwrap();
        assert_eq!(current.width(), 1600);
    }

    #[test]
    fn test_interrupt_stops_running_command_then_quits_when_idle() {
        let quit = CancellationToken::new();
        let command = CancellationToken::new();
        let (tx, rx) = watch::channel(Some(command.clone()));

        assert!(route_interrupt(&rx, &quit));
        assert!(command.is_cancelled());
        assert!(!quit.is_cancelled());

        tx.send_replace(None);
        assert!(!route_interrupt(&rx, &quit));
        assert!(quit.is_cancelled());
    }

    #[tokio::test]
    async fn test_read_image_rejects_non_images() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("specs.txt");
        std::fs::write(&path, "dimensions: 20x30cm").unwrap();
        assert!(matches!(read_image(&path).await, Err(Error::Validation(_))));

        let png = dir.path().join("mug.png");
        std::fs::write(&png, crate::image::test_png()).unwrap();
        assert_eq!(read_image(&png).await.unwrap().mime_type, "image/png");
    }

    #[test]
    fn test_split_destination() {
        let (dir, stem) = split_destination(Path::new("out/best.png")).unwrap();
        assert_eq!(dir, PathBuf::from("out"));
        assert_eq!(stem, "best");

        let (dir, stem) = split_destination(Path::new("mug")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(stem, "mug");
    }

    #[test]
    fn test_preview_truncates_long_prompts() {
        let long = "x".repeat(200);
        assert_eq!(preview(&long).len(), FAVORITE_PROMPT_PREVIEW + 3);
        assert_eq!(preview("short"), "short");
    }
}
