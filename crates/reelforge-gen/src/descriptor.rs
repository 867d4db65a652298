//! Asset descriptors and generation results
//!
//! An `AssetDescriptor` is one unit of requested generation (prompt plus
//! parameters). Descriptors are immutable once enqueued; the orchestrator
//! consumes each exactly once, in queue order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of media being generated, which determines the request payload
/// shape and where the result URL lives in the provider response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Video,
    Audio,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Image => write!(f, "image"),
            Modality::Video => write!(f, "video"),
            Modality::Audio => write!(f, "audio"),
        }
    }
}

impl Modality {
    /// Parse from a lowercase name as used in config and queue files
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Modality::Image),
            "video" => Some(Modality::Video),
            "audio" => Some(Modality::Audio),
            _ => None,
        }
    }

    /// File extension for raw downloads of this modality
    pub fn raw_extension(&self) -> &'static str {
        match self {
            Modality::Image => "png",
            Modality::Video => "mp4",
            Modality::Audio => "mp3",
        }
    }
}

/// Parameters specific to image generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageParams {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

/// Parameters specific to video clip generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoParams {
    /// Clip duration in seconds
    #[serde(default = "default_video_duration")]
    pub duration: f64,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
}

fn default_video_duration() -> f64 {
    5.0
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            duration: default_video_duration(),
            aspect_ratio: default_aspect_ratio(),
        }
    }
}

/// Parameters specific to audio/music generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioParams {
    /// Duration in seconds; the provider caps this, see `MAX_AUDIO_DURATION_SECS`
    #[serde(default = "default_audio_duration")]
    pub duration: f64,
}

fn default_audio_duration() -> f64 {
    30.0
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            duration: default_audio_duration(),
        }
    }
}

/// One unit of requested asset generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Unique id within one run's queue
    pub id: String,
    /// Human-readable name, used in output filenames
    pub name: String,
    /// Prompt text sent to the provider
    pub prompt: String,
    /// Provider model identifier (e.g. "fal-ai/flux-pro/v1.1")
    pub model: String,
    /// Kind of media to generate
    pub modality: Modality,
    /// Image-specific parameters
    #[serde(default)]
    pub image: Option<ImageParams>,
    /// Video-specific parameters
    #[serde(default)]
    pub video: Option<VideoParams>,
    /// Audio-specific parameters
    #[serde(default)]
    pub audio: Option<AudioParams>,
    /// Random seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
    /// Informational priority label; the orchestrator never reorders on it
    #[serde(default)]
    pub priority: Option<String>,
    /// Free-form scene/category tag
    #[serde(default)]
    pub scene: Option<String>,
    /// Output version suffix for the filename (`_vN`)
    #[serde(default)]
    pub version: Option<u32>,
}

impl AssetDescriptor {
    /// Minimal descriptor with defaults for everything optional
    pub fn new(id: &str, name: &str, prompt: &str, model: &str, modality: Modality) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            prompt: prompt.to_string(),
            model: model.to_string(),
            modality,
            image: None,
            video: None,
            audio: None,
            seed: None,
            priority: None,
            scene: None,
            version: None,
        }
    }
}

/// Outcome of one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationOutcome {
    /// Provider returned a downloadable result
    Completed { url: String },
    /// Network error, provider error, or malformed response
    Failed { reason: String },
}

/// The result of one generation submission. Created by the client adapter,
/// consumed by the orchestrator and manifest tracker; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub asset_id: String,
    pub outcome: GenerationOutcome,
    pub elapsed_secs: f64,
}

impl GenerationResult {
    pub fn completed(asset_id: &str, url: String, elapsed_secs: f64) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            outcome: GenerationOutcome::Completed { url },
            elapsed_secs,
        }
    }

    pub fn failed(asset_id: &str, reason: String, elapsed_secs: f64) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            outcome: GenerationOutcome::Failed { reason },
            elapsed_secs,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, GenerationOutcome::Completed { .. })
    }

    /// Result URL if the generation succeeded
    pub fn url(&self) -> Option<&str> {
        match &self.outcome {
            GenerationOutcome::Completed { url } => Some(url),
            GenerationOutcome::Failed { .. } => None,
        }
    }

    /// Failure reason if the generation failed
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            GenerationOutcome::Completed { .. } => None,
            GenerationOutcome::Failed { reason } => Some(reason),
        }
    }
}
