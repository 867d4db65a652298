//! Error types for Reelforge
//!
//! Only `ConfigMissing` and `DuplicateAssetId` are fatal to a batch run.
//! Every other variant is recorded per-item and the batch continues.

use thiserror::Error;

/// The main error type for Reelforge operations
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("Required config or input file missing: {0}")]
    ConfigMissing(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Duplicate asset id in queue: {0}")]
    DuplicateAssetId(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Unparseable provider response: {0}")]
    ResponseUnparseable(String),

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for Reelforge operations
pub type Result<T> = std::result::Result<T, ReelError>;

impl ReelError {
    /// Whether this error aborts the whole run rather than a single item
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReelError::ConfigMissing(_) | ReelError::DuplicateAssetId(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ReelError::ConfigMissing("queue.toml".to_string()).is_fatal());
        assert!(ReelError::DuplicateAssetId("intro_bg".to_string()).is_fatal());
        assert!(!ReelError::RequestFailed("timeout".to_string()).is_fatal());
        assert!(!ReelError::ConversionFailed("bad png".to_string()).is_fatal());
        assert!(!ReelError::ConfigError("bad quality".to_string()).is_fatal());
        assert!(!ReelError::JsonError("truncated".to_string()).is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let e = ReelError::ResponseUnparseable("no url field".to_string());
        assert!(e.to_string().contains("no url field"));
    }
}
