//! Data models and structures
//!
//! Defines generation requests, produced artifacts, style tags and the
//! process configuration.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

pub const MAX_IMAGE_COUNT: u8 = 4;
pub const ASPECT_RATIOS: [&str; 5] = ["1:1", "3:4", "4:3", "9:16", "16:9"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    #[default]
    Ecommerce,
    Lifestyle,
    Artistic,
}

impl StyleTag {
    pub const ALL: [StyleTag; 3] = [StyleTag::Ecommerce, StyleTag::Lifestyle, StyleTag::Artistic];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleTag::Ecommerce => "ecommerce",
            StyleTag::Lifestyle => "lifestyle",
            StyleTag::Artistic => "artistic",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecommerce" | "e-commerce" | "e-commerce product" => Ok(StyleTag::Ecommerce),
            "lifestyle" | "real-world lifestyle" => Ok(StyleTag::Lifestyle),
            "artistic" | "creative" | "creative artistic" => Ok(StyleTag::Artistic),
            other => Err(Error::Validation(format!(
                "Unknown style '{}'. Expected one of: ecommerce, lifestyle, artistic",
                other
            ))),
        }
    }
}

/// User-supplied image used to steer generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceImage {
    /// Wraps raw bytes, sniffing the mime type from the content.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = crate::ai::mime::detect_image_mime(&bytes).to_string();
        Self { bytes, mime_type }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub reference_image: Option<ReferenceImage>,
    pub style: StyleTag,
    pub count: u8,
    /// Imagen aspect ratio; the model default (1:1) when unset.
    pub aspect_ratio: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, style: StyleTag) -> Self {
        Self {
            prompt: prompt.into(),
            style,
            count: 1,
            ..Default::default()
        }
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative.into());
        self
    }

    pub fn with_reference_image(mut self, image: ReferenceImage) -> Self {
        self.reference_image = Some(image);
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    /// Negative prompt with surrounding whitespace removed, if any is left.
    pub fn negative_prompt(&self) -> Option<&str> {
        self.negative_prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Rejects requests that must never reach the remote service.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() && self.reference_image.is_none() {
            return Err(Error::Validation(
                "Enter a prompt or provide a reference image".to_string(),
            ));
        }
        if self.count == 0 || self.count > MAX_IMAGE_COUNT {
            return Err(Error::Validation(format!(
                "Image count must be between 1 and {}, got {}",
                MAX_IMAGE_COUNT, self.count
            )));
        }
        if let Some(ratio) = &self.aspect_ratio {
            parse_aspect_ratio(ratio)?;
        }
        Ok(())
    }
}

/// Checks `input` against the ratios Imagen accepts.
pub fn parse_aspect_ratio(input: &str) -> Result<String> {
    let ratio = input.trim();
    if ASPECT_RATIOS.contains(&ratio) {
        Ok(ratio.to_string())
    } else {
        Err(Error::Validation(format!(
            "Unsupported aspect ratio '{}'. Expected one of: {}",
            ratio,
            ASPECT_RATIOS.join(", ")
        )))
    }
}

/// Image bytes returned by a generation call, before provenance is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    #[serde(skip)]
    pub media: Vec<u8>,
    pub mime_type: String,
    pub kind: MediaKind,
    pub source_prompt: String,
    pub style: StyleTag,
    pub created_at: DateTime<Utc>,
    pub iteration: u32,
}

impl Artifact {
    pub fn image(image: GeneratedImage, source_prompt: &str, style: StyleTag, iteration: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            media: image.bytes,
            mime_type: image.mime_type,
            kind: MediaKind::Image,
            source_prompt: source_prompt.to_string(),
            style,
            created_at: Utc::now(),
            iteration,
        }
    }

    pub fn video(bytes: Vec<u8>, source_prompt: &str, style: StyleTag, iteration: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            media: bytes,
            mime_type: "video/mp4".to_string(),
            kind: MediaKind::Video,
            source_prompt: source_prompt.to_string(),
            style,
            created_at: Utc::now(),
            iteration,
        }
    }
}

/// How long to wait on a video operation.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` keeps polling until the operation reports completion.
    pub max_polls: Option<usize>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(45),
            max_polls: None,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: String,
    pub location: String,
    pub credentials_path: PathBuf,
    pub imagen_model: String,
    pub vision_model: String,
    pub edit_model: String,
    pub video_model: String,
    pub poll: PollSettings,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let interval_secs = match lookup("VIDEO_POLL_INTERVAL_SECS") {
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(Error::Config(format!(
                        "VIDEO_POLL_INTERVAL_SECS must be a positive integer, got '{}'",
                        v
                    )))
                }
            },
            None => 45,
        };
        let max_polls = match lookup("VIDEO_MAX_POLLS") {
            Some(v) => Some(v.parse::<usize>().map_err(|_| {
                Error::Config(format!("VIDEO_MAX_POLLS must be an integer, got '{}'", v))
            })?),
            None => None,
        };

        Ok(Self {
            project_id: required("GOOGLE_CLOUD_PROJECT")?,
            location: or_default("GOOGLE_CLOUD_LOCATION", "us-central1"),
            credentials_path: PathBuf::from(required("GOOGLE_APPLICATION_CREDENTIALS")?),
            imagen_model: or_default("IMAGEN_MODEL", "imagen-4.0-generate-001"),
            vision_model: or_default("VISION_MODEL", "gemini-2.5-flash"),
            edit_model: or_default("EDIT_MODEL", "gemini-2.0-flash-preview-image-generation"),
            video_model: or_default("VIDEO_MODEL", "veo-3.0-generate-preview"),
            poll: PollSettings {
                interval: Duration::from_secs(interval_secs),
                max_polls,
            },
            output_dir: PathBuf::from(or_default("OUTPUT_DIR", "output")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_style_tag_parsing() {
        assert_eq!("ecommerce".parse::<StyleTag>().unwrap(), StyleTag::Ecommerce);
        assert_eq!("Lifestyle".parse::<StyleTag>().unwrap(), StyleTag::Lifestyle);
        assert_eq!("creative".parse::<StyleTag>().unwrap(), StyleTag::Artistic);
        assert_eq!(
            "Creative Artistic".parse::<StyleTag>().unwrap(),
            StyleTag::Artistic
        );
        assert!(matches!(
            "noir".parse::<StyleTag>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_style_tag_serialization() {
        let json = serde_json::to_string(&StyleTag::Lifestyle).unwrap();
        assert_eq!(json, "\"lifestyle\"");
    }

    #[test]
    fn test_validate_rejects_empty_prompt_without_reference() {
        let request = GenerationRequest::new("   ", StyleTag::Ecommerce);
        assert!(matches!(request.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_validate_accepts_reference_image_without_prompt() {
        let request = GenerationRequest::new("", StyleTag::Ecommerce)
            .with_reference_image(ReferenceImage::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_count() {
        let zero = GenerationRequest::new("a lamp", StyleTag::Ecommerce).with_count(0);
        let five = GenerationRequest::new("a lamp", StyleTag::Ecommerce).with_count(5);
        assert!(zero.validate().is_err());
        assert!(five.validate().is_err());
    }

    #[test]
    fn test_validate_checks_aspect_ratio() {
        let wide = GenerationRequest::new("a lamp", StyleTag::Ecommerce).with_aspect_ratio("16:9");
        assert!(wide.validate().is_ok());

        let odd = GenerationRequest::new("a lamp", StyleTag::Ecommerce).with_aspect_ratio("2:1");
        assert!(matches!(odd.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_negative_prompt_blank_is_none() {
        let request = GenerationRequest::new("a lamp", StyleTag::Ecommerce).with_negative_prompt("  ");
        assert_eq!(request.negative_prompt(), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_CLOUD_PROJECT", "demo-project"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/sa.json"),
        ]))
        .unwrap();

        assert_eq!(config.location, "us-central1");
        assert_eq!(config.imagen_model, "imagen-4.0-generate-001");
        assert_eq!(config.video_model, "veo-3.0-generate-preview");
        assert_eq!(config.poll.interval, Duration::from_secs(45));
        assert_eq!(config.poll.max_polls, None);
    }

    #[test]
    fn test_config_requires_project() {
        let err = Config::from_lookup(lookup_from(&[(
            "GOOGLE_APPLICATION_CREDENTIALS",
            "/tmp/sa.json",
        )]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_parses_poll_bounds() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_CLOUD_PROJECT", "p"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/sa.json"),
            ("VIDEO_POLL_INTERVAL_SECS", "10"),
            ("VIDEO_MAX_POLLS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.poll.interval, Duration::from_secs(10));
        assert_eq!(config.poll.max_polls, Some(30));

        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_CLOUD_PROJECT", "p"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/sa.json"),
            ("VIDEO_MAX_POLLS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_rejects_zero_poll_interval() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_CLOUD_PROJECT", "p"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/sa.json"),
            ("VIDEO_POLL_INTERVAL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("positive")));
    }
}
