//! Video job lifecycle
//!
//! Submits a video request and waits for the remote operation to finish:
//! `Submitted -> Polling -> Done | Failed`. The wait sleeps a fixed interval
//! between status checks, optionally bounded by a maximum number of checks,
//! and can be cancelled while sleeping. Cancelling stops the local wait only;
//! the remote job keeps running.

use crate::ai::mime::decode_if_base64_video;
use crate::ai::{OperationHandle, OperationStatus, VideoRequest, VideoService};
use crate::image::prepare_video_reference;
use crate::models::{PollSettings, ReferenceImage};
use crate::{Error, Result};
use std::fmt;
use tokio_retry::strategy::FixedInterval;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoJobState {
    Submitted,
    Polling,
    Done,
    Failed,
}

impl VideoJobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoJobState::Done | VideoJobState::Failed)
    }
}

impl fmt::Display for VideoJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VideoJobState::Submitted => "SUBMITTED",
            VideoJobState::Polling => "POLLING",
            VideoJobState::Done => "DONE",
            VideoJobState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Result of one video job together with the states it went through.
#[derive(Debug)]
pub struct VideoJobOutcome {
    pub states: Vec<VideoJobState>,
    pub result: Result<Vec<u8>>,
}

impl VideoJobOutcome {
    pub fn final_state(&self) -> Option<VideoJobState> {
        self.states.last().copied()
    }

    pub fn into_result(self) -> Result<Vec<u8>> {
        self.result
    }
}

pub struct VideoPoller<'a> {
    service: &'a dyn VideoService,
    settings: PollSettings,
    cancel: CancellationToken,
}

impl<'a> VideoPoller<'a> {
    pub fn new(service: &'a dyn VideoService, settings: PollSettings, cancel: CancellationToken) -> Self {
        Self {
            service,
            settings,
            cancel,
        }
    }

    /// Runs a video job to a terminal state.
    ///
    /// A blank prompt is rejected before anything is sent and records no
    /// state at all.
    pub async fn run(&self, prompt: &str, reference: Option<&ReferenceImage>) -> VideoJobOutcome {
        let mut states = Vec::new();

        if prompt.trim().is_empty() {
            return VideoJobOutcome {
                states,
                result: Err(Error::Validation(
                    "Enter a video prompt describing the motion or action".to_string(),
                )),
            };
        }

        let result = self.drive(prompt.trim(), reference, &mut states).await;
        match &result {
            Ok(bytes) => {
                transition(&mut states, VideoJobState::Done);
                info!("Video generated ({} bytes)", bytes.len());
            }
            Err(e) => {
                transition(&mut states, VideoJobState::Failed);
                error!("Video generation failed: {}", e);
            }
        }

        VideoJobOutcome { states, result }
    }

    async fn drive(
        &self,
        prompt: &str,
        reference: Option<&ReferenceImage>,
        states: &mut Vec<VideoJobState>,
    ) -> Result<Vec<u8>> {
        let image = match reference {
            Some(image) => Some(prepare_video_reference(image).await?),
            None => None,
        };

        let request = VideoRequest {
            prompt: prompt.to_string(),
            image,
            ..Default::default()
        };

        let handle = self.service.submit_video(&request).await?;
        transition(states, VideoJobState::Submitted);

        self.wait_for_completion(&handle, states).await
    }

    async fn wait_for_completion(
        &self,
        handle: &OperationHandle,
        states: &mut Vec<VideoJobState>,
    ) -> Result<Vec<u8>> {
        let schedule = FixedInterval::new(self.settings.interval);
        let schedule: Box<dyn Iterator<Item = std::time::Duration> + Send> = match self.settings.max_polls {
            Some(max) => Box::new(schedule.take(max)),
            None => Box::new(schedule),
        };

        let mut polls = 0usize;
        for delay in schedule {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    warn!("Stopped waiting for {} after {} status checks", handle, polls);
                    return Err(Error::Cancelled(format!(
                        "Stopped waiting for video operation {}",
                        handle
                    )));
                }
                _ = tokio::time::sleep(delay) => {}
            }

            if polls == 0 {
                transition(states, VideoJobState::Polling);
            }
            polls += 1;

            match self.service.fetch_operation(handle).await? {
                OperationStatus::Pending => {
                    info!("Video operation still running (check {})", polls);
                }
                OperationStatus::Failed { message } => {
                    return Err(Error::AiProvider(format!(
                        "Video operation failed: {}",
                        message
                    )));
                }
                OperationStatus::Succeeded { video: Some(bytes) } => {
                    let video = decode_if_base64_video(bytes)?;
                    if video.is_empty() {
                        return Err(Error::malformed(
                            "Video generation finished with an empty video payload",
                        ));
                    }
                    return Ok(video);
                }
                OperationStatus::Succeeded { video: None } => {
                    return Err(Error::malformed(
                        "Video generation finished without returning video bytes",
                    ));
                }
            }
        }

        Err(Error::Timeout(format!(
            "Video operation {} still running after {} status checks",
            handle, polls
        )))
    }
}

fn transition(states: &mut Vec<VideoJobState>, next: VideoJobState) {
    match states.last() {
        Some(prev) => info!("Video job {} -> {}", prev, next),
        None => info!("Video job {}", next),
    }
    states.push(next);
}
