//! Run manifest tracking
//!
//! Accumulates one record per successfully generated asset and persists a
//! JSON summary at the end of the run. The saved total always equals the
//! number of entries appended; nothing is dropped or deduplicated.

use reelforge_core::{now_iso8601, ReelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A record of a single generated asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub prompt: String,
    pub asset_type: String,
    pub asset_id: String,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub timestamp: String,
}

/// The persisted manifest document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub total_assets: usize,
    pub generation_timestamp: String,
    pub completion_timestamp: String,
    pub assets: Vec<ManifestEntry>,
}

/// In-memory tracker for one batch run, owned by the orchestrator's
/// single thread
#[derive(Debug, Clone)]
pub struct ManifestTracker {
    started_at: String,
    entries: Vec<ManifestEntry>,
}

impl ManifestTracker {
    /// Start tracking a new run; records the batch-start timestamp
    pub fn new() -> Self {
        Self {
            started_at: now_iso8601(),
            entries: Vec::new(),
        }
    }

    /// Append one entry, stamping it with the current time
    #[allow(clippy::too_many_arguments)]
    pub fn add_asset(
        &mut self,
        filename: &str,
        prompt: &str,
        asset_type: &str,
        asset_id: &str,
        result_url: Option<String>,
        local_path: Option<String>,
        metadata: HashMap<String, String>,
    ) {
        self.entries.push(ManifestEntry {
            filename: filename.to_string(),
            prompt: prompt.to_string(),
            asset_type: asset_type.to_string(),
            asset_id: asset_id.to_string(),
            result_url,
            local_path,
            metadata,
            timestamp: now_iso8601(),
        });
    }

    /// Number of entries appended so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Persist the manifest as a JSON document; the completion timestamp is
    /// set at save time. Re-saving overwrites the same path.
    pub fn save_manifest(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let doc = ManifestDocument {
            total_assets: self.entries.len(),
            generation_timestamp: self.started_at.clone(),
            completion_timestamp: now_iso8601(),
            assets: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&doc).map_err(|e| {
            ReelError::JsonError(format!("Failed to serialize manifest: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(path.to_path_buf())
    }
}

impl Default for ManifestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestDocument {
    /// Load a saved manifest for inspection
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReelError::ConfigMissing(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let doc: ManifestDocument = serde_json::from_str(&content).map_err(|e| {
            ReelError::JsonError(format!(
                "Failed to parse manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(doc)
    }
}
