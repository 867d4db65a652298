//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `REELFORGE_API_KEY`, `REELFORGE_API_URL`
//! 2. Project-local: `.reelforge/config.toml`
//! 3. Global: `~/.reelforge/config.toml`
//!
//! The resolved config is constructed once at startup and passed into the
//! cost guard and orchestrator explicitly; there is no ambient state.

use crate::descriptor::Modality;
use reelforge_core::{ReelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Provider credentials and endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Per-model unit prices and the confirmation threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Unit prices above this require interactive confirmation
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Price assumed for models absent from the table
    #[serde(default)]
    pub fallback_price: f64,
    /// Model identifier -> unit cost per generation
    #[serde(default)]
    pub models: HashMap<String, f64>,
}

fn default_threshold() -> f64 {
    0.50
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            fallback_price: 0.0,
            models: HashMap::new(),
        }
    }
}

/// Output format table and encoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Target format for images: "jpeg" or "png"
    #[serde(default = "default_image_format")]
    pub image_format: String,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_image_format() -> String {
    "jpeg".to_string()
}

fn default_jpeg_quality() -> u8 {
    92
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_format: default_image_format(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on the blocking generation wait, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Model capability overrides: model identifier -> modality name
    #[serde(default)]
    pub models: HashMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            models: HashMap::new(),
        }
    }
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReelConfigFile {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct ReelConfig {
    pub provider: ProviderConfig,
    pub pricing: PricingConfig,
    pub output: OutputConfig,
    pub generation: GenerationConfig,
}

impl ReelConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = ReelConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".reelforge/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config);

        Ok(Self::from_file_struct(config))
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(Self::from_file_struct(config))
    }

    fn from_file_struct(config: ReelConfigFile) -> Self {
        ReelConfig {
            provider: config.provider,
            pricing: config.pricing,
            output: config.output,
            generation: config.generation,
        }
    }

    /// Provider API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.provider.api_key.as_deref()
    }

    /// Provider base URL (or the built-in default)
    pub fn api_url(&self) -> &str {
        self.provider.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Modality overrides from config, parsed
    pub fn model_overrides(&self) -> Vec<(String, Modality)> {
        self.generation
            .models
            .iter()
            .filter_map(|(model, modality)| {
                Modality::parse(modality).map(|m| (model.clone(), m))
            })
            .collect()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".reelforge").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ReelConfigFile> {
        let content = std::fs::read_to_string(path).map_err(|_| {
            ReelError::ConfigMissing(path.display().to_string())
        })?;
        let config: ReelConfigFile = toml::from_str(&content).map_err(|e| {
            ReelError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    fn merge_into(base: &mut ReelConfigFile, overlay: ReelConfigFile) {
        if overlay.provider.api_key.is_some() {
            base.provider.api_key = overlay.provider.api_key;
        }
        if overlay.provider.api_url.is_some() {
            base.provider.api_url = overlay.provider.api_url;
        }

        if overlay.pricing.threshold != default_threshold() {
            base.pricing.threshold = overlay.pricing.threshold;
        }
        if overlay.pricing.fallback_price != 0.0 {
            base.pricing.fallback_price = overlay.pricing.fallback_price;
        }
        for (model, price) in overlay.pricing.models {
            base.pricing.models.insert(model, price);
        }

        if overlay.output.image_format != default_image_format() {
            base.output.image_format = overlay.output.image_format;
        }
        if overlay.output.jpeg_quality != default_jpeg_quality() {
            base.output.jpeg_quality = overlay.output.jpeg_quality;
        }

        if overlay.generation.timeout_secs != default_timeout_secs() {
            base.generation.timeout_secs = overlay.generation.timeout_secs;
        }
        for (model, modality) in overlay.generation.models {
            base.generation.models.insert(model, modality);
        }
    }

    fn apply_env_overrides(config: &mut ReelConfigFile) {
        if let Ok(key) = std::env::var("REELFORGE_API_KEY") {
            config.provider.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("REELFORGE_API_URL") {
            config.provider.api_url = Some(url);
        }
    }
}

/// Default provider endpoint (fal.ai synchronous queue)
pub const DEFAULT_API_URL: &str = "https://fal.run";
