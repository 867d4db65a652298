//! Generation client adapter
//!
//! Wraps the external generative-media API: one descriptor in, one
//! `GenerationResult` out. Submission is strictly synchronous, one asset
//! at a time. Failures come back as data, never as an `Err` to the
//! orchestrator, so the batch can keep moving.

use crate::config::ReelConfig;
use crate::descriptor::{AssetDescriptor, GenerationResult, Modality};
use crate::transport::{HttpTransport, Transport};
use reelforge_core::{ReelError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Provider-imposed cap on audio generation length
pub const MAX_AUDIO_DURATION_SECS: f64 = 47.0;

/// Which modality each known model identifier serves
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: HashMap<String, Modality>,
}

impl ModelCatalog {
    /// Built-in capability map for the default provider's model ids
    pub fn builtin() -> Self {
        let mut models = HashMap::new();
        for (id, modality) in [
            ("fal-ai/flux/dev", Modality::Image),
            ("fal-ai/flux-pro/v1.1", Modality::Image),
            ("fal-ai/recraft/v3", Modality::Image),
            ("fal-ai/kling-video/v2/master", Modality::Video),
            ("fal-ai/veo3", Modality::Video),
            ("fal-ai/stable-audio", Modality::Audio),
            ("fal-ai/lyria2", Modality::Audio),
        ] {
            models.insert(id.to_string(), modality);
        }
        Self { models }
    }

    /// Built-in map extended with config overrides
    pub fn from_config(config: &ReelConfig) -> Self {
        let mut catalog = Self::builtin();
        for (model, modality) in config.model_overrides() {
            catalog.models.insert(model, modality);
        }
        catalog
    }

    pub fn modality_of(&self, model: &str) -> Option<Modality> {
        self.models.get(model).copied()
    }
}

/// Extract the downloadable result URL from a provider response.
///
/// Each modality nests the URL differently; the descriptor's declared
/// modality selects the extractor, never runtime shape-sniffing.
pub fn extract_result_url(modality: Modality, response: &serde_json::Value) -> Option<&str> {
    match modality {
        Modality::Image => response
            .get("images")
            .and_then(|imgs| imgs.as_array())
            .and_then(|arr| arr.first())
            .and_then(|img| img.get("url"))
            .and_then(|u| u.as_str()),
        Modality::Video => response
            .get("video")
            .and_then(|v| v.get("url"))
            .and_then(|u| u.as_str()),
        Modality::Audio => response
            .get("audio")
            .and_then(|a| a.get("url"))
            .and_then(|u| u.as_str()),
    }
}

/// Synchronous client for the generation API
pub struct GenerationClient {
    transport: Box<dyn Transport>,
    base_url: String,
    catalog: ModelCatalog,
}

impl GenerationClient {
    /// Real HTTP client from resolved config
    pub fn from_config(config: &ReelConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            ReelError::ConfigError(
                "API key not configured. Set REELFORGE_API_KEY or add to .reelforge/config.toml"
                    .to_string(),
            )
        })?;
        Ok(Self {
            transport: Box::new(HttpTransport::new(api_key, config.generation.timeout_secs)),
            base_url: config.api_url().to_string(),
            catalog: ModelCatalog::from_config(config),
        })
    }

    /// Client over an arbitrary transport (mock for tests and dry runs)
    pub fn with_transport(transport: Box<dyn Transport>, config: &ReelConfig) -> Self {
        Self {
            transport,
            base_url: config.api_url().to_string(),
            catalog: ModelCatalog::from_config(config),
        }
    }

    /// Submit one descriptor and await completion.
    ///
    /// Never returns `Err`: constraint violations, request failures, and
    /// unparseable responses all become a failed `GenerationResult`.
    pub fn generate(&self, descriptor: &AssetDescriptor) -> GenerationResult {
        let start = std::time::Instant::now();
        match self.try_generate(descriptor) {
            Ok(url) => {
                GenerationResult::completed(&descriptor.id, url, start.elapsed().as_secs_f64())
            }
            Err(e) => GenerationResult::failed(
                &descriptor.id,
                e.to_string(),
                start.elapsed().as_secs_f64(),
            ),
        }
    }

    fn try_generate(&self, descriptor: &AssetDescriptor) -> Result<String> {
        if descriptor.prompt.trim().is_empty() {
            return Err(ReelError::RequestFailed(format!(
                "empty prompt for asset '{}'",
                descriptor.id
            )));
        }

        match self.catalog.modality_of(&descriptor.model) {
            None => {
                return Err(ReelError::RequestFailed(format!(
                    "unknown model '{}'",
                    descriptor.model
                )));
            }
            Some(m) if m != descriptor.modality => {
                return Err(ReelError::RequestFailed(format!(
                    "model '{}' generates {}, not {}",
                    descriptor.model, m, descriptor.modality
                )));
            }
            Some(_) => {}
        }

        let payload = build_payload(descriptor);
        let endpoint = format!("{}/{}", self.base_url, descriptor.model);
        let response = self.transport.post_json(&endpoint, &payload)?;

        extract_result_url(descriptor.modality, &response)
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ReelError::ResponseUnparseable(format!(
                    "no {} result URL in response: {}",
                    descriptor.modality,
                    serde_json::to_string(&response).unwrap_or_default()
                ))
            })
    }

    /// Download a generated asset to a local file
    pub fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = self.transport.get_bytes(url)?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &bytes)?;
        Ok(())
    }
}

/// Map descriptor fields into the provider's argument names for the
/// descriptor's modality
pub fn build_payload(descriptor: &AssetDescriptor) -> serde_json::Value {
    let mut payload = match descriptor.modality {
        Modality::Image => {
            let params = descriptor.image.clone().unwrap_or_default();
            serde_json::json!({
                "prompt": descriptor.prompt,
                "image_size": {
                    "width": params.width,
                    "height": params.height
                },
                "num_images": 1
            })
        }
        Modality::Video => {
            let params = descriptor.video.clone().unwrap_or_default();
            serde_json::json!({
                "prompt": descriptor.prompt,
                "duration": params.duration,
                "aspect_ratio": params.aspect_ratio
            })
        }
        Modality::Audio => {
            let params = descriptor.audio.clone().unwrap_or_default();
            serde_json::json!({
                "prompt": descriptor.prompt,
                "duration_seconds": params.duration.min(MAX_AUDIO_DURATION_SECS)
            })
        }
    };

    if let Some(seed) = descriptor.seed {
        payload["seed"] = serde_json::json!(seed);
    }

    payload
}
