//! Queue sources
//!
//! A `QueueSource` produces the ordered descriptor list one batch run
//! consumes. The TOML queue file is the primary source; chapter-marker
//! files (see `markers`) are the other.

use crate::descriptor::AssetDescriptor;
use reelforge_core::{ReelError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Anything that can build an ordered queue of asset descriptors
pub trait QueueSource {
    fn build_queue(&self) -> Result<Vec<AssetDescriptor>>;
}

#[derive(Deserialize)]
struct QueueFile {
    #[serde(default)]
    assets: Vec<AssetDescriptor>,
}

/// Queue loaded from a TOML file of `[[assets]]` tables
pub struct TomlQueue {
    path: PathBuf,
}

impl TomlQueue {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl QueueSource for TomlQueue {
    fn build_queue(&self) -> Result<Vec<AssetDescriptor>> {
        if !self.path.exists() {
            return Err(ReelError::ConfigMissing(self.path.display().to_string()));
        }
        let content = std::fs::read_to_string(&self.path)?;
        let file: QueueFile = toml::from_str(&content).map_err(|e| {
            ReelError::ConfigError(format!(
                "Failed to parse queue {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(file.assets)
    }
}

/// Enforce the queue invariant: asset ids unique within one run
pub fn validate_queue(queue: &[AssetDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for descriptor in queue {
        if !seen.insert(descriptor.id.as_str()) {
            return Err(ReelError::DuplicateAssetId(descriptor.id.clone()));
        }
    }
    Ok(())
}
