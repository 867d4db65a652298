//! Reelforge Gen - batch media-asset generation pipeline
//!
//! Builds ordered queues of asset descriptors (images, video clips, music,
//! chapter-marker cards), gates submission on a per-model price table,
//! submits each descriptor sequentially to a generative-media API,
//! normalizes downloaded formats, and records a JSON run manifest.

pub mod batch;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod manifest;
pub mod markers;
pub mod naming;
pub mod normalize;
pub mod pricing;
pub mod queue;
pub mod transport;

pub use batch::{run_batch, BatchOutcome, BatchSummary, ItemReport, ItemState};
pub use client::{GenerationClient, ModelCatalog, MAX_AUDIO_DURATION_SECS};
pub use config::ReelConfig;
pub use descriptor::{
    AssetDescriptor, AudioParams, GenerationOutcome, GenerationResult, ImageParams, Modality,
    VideoParams,
};
pub use manifest::{ManifestDocument, ManifestEntry, ManifestTracker};
pub use markers::{load_markers, ChapterMarker, MarkerQueue};
pub use normalize::{normalize, TargetFormat};
pub use pricing::{AutoConfirm, ConfirmPrompt, CostGuard, PricingTable, StdinConfirm};
pub use queue::{QueueSource, TomlQueue};
pub use transport::{HttpTransport, MockTransport, Transport};
