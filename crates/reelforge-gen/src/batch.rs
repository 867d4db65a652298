//! Batch orchestration
//!
//! Drives the queue strictly sequentially: cost check, submit, await,
//! download, normalize, record. One descriptor's failure never halts the
//! batch; each item lands in a terminal state and the run summary counts
//! them for the operator.

use crate::client::GenerationClient;
use crate::config::OutputConfig;
use crate::descriptor::{AssetDescriptor, Modality};
use crate::manifest::ManifestTracker;
use crate::naming::build_filename;
use crate::normalize::{normalize, TargetFormat};
use crate::pricing::CostGuard;
use crate::queue::validate_queue;
use reelforge_core::{ContentHash, Result};
use std::collections::HashMap;
use std::path::Path;

/// Terminal state of one queue item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Cost confirmation declined
    Skipped,
    /// Generation, download, or normalization failed
    Failed,
    /// Generated and downloaded; no normalization applies to this modality
    Succeeded,
    /// Generated, downloaded, and normalized
    Normalized,
}

/// Per-item outcome for the run report
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub asset_id: String,
    pub state: ItemState,
    pub detail: Option<String>,
}

/// Operator-facing run summary
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Full outcome of one batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub items: Vec<ItemReport>,
    pub summary: BatchSummary,
}

/// Process every descriptor in queue order.
///
/// Fatal only for queue-invariant violations (duplicate ids); everything
/// per-item is isolated and surfaced in the returned report.
pub fn run_batch(
    queue: &[AssetDescriptor],
    client: &GenerationClient,
    guard: &mut CostGuard<'_>,
    output: &OutputConfig,
    output_dir: &Path,
    tracker: &mut ManifestTracker,
) -> Result<BatchOutcome> {
    validate_queue(queue)?;
    let target_format = TargetFormat::from_name(&output.image_format, output.jpeg_quality)?;

    println!("Processing {} assets...", queue.len());

    let mut items = Vec::with_capacity(queue.len());
    let mut summary = BatchSummary {
        total: queue.len(),
        ..Default::default()
    };

    for (i, descriptor) in queue.iter().enumerate() {
        let index = i + 1;
        println!(
            "  [{}/{}] {} ({})",
            index,
            queue.len(),
            descriptor.id,
            descriptor.modality
        );

        let report = process_item(
            index,
            descriptor,
            client,
            guard,
            target_format,
            output_dir,
            tracker,
        );

        match report.state {
            ItemState::Skipped => summary.skipped += 1,
            ItemState::Failed => summary.failed += 1,
            ItemState::Succeeded | ItemState::Normalized => summary.succeeded += 1,
        }
        items.push(report);
    }

    println!(
        "Batch complete: {} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );

    Ok(BatchOutcome { items, summary })
}

fn process_item(
    index: usize,
    descriptor: &AssetDescriptor,
    client: &GenerationClient,
    guard: &mut CostGuard<'_>,
    target_format: TargetFormat,
    output_dir: &Path,
    tracker: &mut ManifestTracker,
) -> ItemReport {
    if !guard.check_generation_cost(&descriptor.model) {
        println!("    skipped (cost declined)");
        return ItemReport {
            asset_id: descriptor.id.clone(),
            state: ItemState::Skipped,
            detail: Some("cost confirmation declined".to_string()),
        };
    }

    let result = client.generate(descriptor);
    let url = match result.url() {
        Some(url) => url.to_string(),
        None => {
            let reason = result
                .failure_reason()
                .unwrap_or("unknown failure")
                .to_string();
            println!("    FAILED: {}", reason);
            return ItemReport {
                asset_id: descriptor.id.clone(),
                state: ItemState::Failed,
                detail: Some(reason),
            };
        }
    };

    let asset_type = descriptor.modality.to_string();
    let raw_ext = extension_from_url(&url)
        .unwrap_or_else(|| descriptor.modality.raw_extension().to_string());

    // Images go through the normalizer; video and audio are final as downloaded
    let needs_normalize = descriptor.modality == Modality::Image;
    let raw_name = build_filename(index, &asset_type, &descriptor.name, descriptor.version, &raw_ext);
    let raw_path = if needs_normalize {
        output_dir.join("raw").join(&raw_name)
    } else {
        output_dir.join(&raw_name)
    };

    if let Err(e) = client.download(&url, &raw_path) {
        println!("    FAILED: {}", e);
        return ItemReport {
            asset_id: descriptor.id.clone(),
            state: ItemState::Failed,
            detail: Some(e.to_string()),
        };
    }

    let mut metadata = item_metadata(descriptor, result.elapsed_secs, &raw_path);

    let (state, detail, final_path, final_name) = if needs_normalize {
        let target_name = build_filename(
            index,
            &asset_type,
            &descriptor.name,
            descriptor.version,
            target_format.extension(),
        );
        let target_path = output_dir.join(&target_name);
        match normalize(&raw_path, &target_path, target_format) {
            Ok(path) => {
                println!(
                    "    generated in {:.1}s -> {}",
                    result.elapsed_secs,
                    path.display()
                );
                (ItemState::Normalized, None, path, target_name)
            }
            Err(e) => {
                println!("    normalization failed: {}", e);
                metadata.insert("normalization_error".to_string(), e.to_string());
                (
                    ItemState::Failed,
                    Some(e.to_string()),
                    raw_path.clone(),
                    raw_name.clone(),
                )
            }
        }
    } else {
        println!(
            "    generated in {:.1}s -> {}",
            result.elapsed_secs,
            raw_path.display()
        );
        (ItemState::Succeeded, None, raw_path.clone(), raw_name.clone())
    };

    // Generation reached SUCCEEDED, so the entry is recorded even when
    // normalization failed; local_path then points at the raw download.
    tracker.add_asset(
        &final_name,
        &descriptor.prompt,
        &asset_type,
        &descriptor.id,
        Some(url),
        Some(final_path.to_string_lossy().to_string()),
        metadata,
    );

    ItemReport {
        asset_id: descriptor.id.clone(),
        state,
        detail,
    }
}

fn item_metadata(
    descriptor: &AssetDescriptor,
    elapsed_secs: f64,
    raw_path: &Path,
) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("model".to_string(), descriptor.model.clone());
    metadata.insert("elapsed_secs".to_string(), format!("{:.2}", elapsed_secs));
    if let Some(seed) = descriptor.seed {
        metadata.insert("seed".to_string(), seed.to_string());
    }
    if let Some(scene) = &descriptor.scene {
        metadata.insert("scene".to_string(), scene.clone());
    }
    if let Some(priority) = &descriptor.priority {
        metadata.insert("priority".to_string(), priority.clone());
    }
    if let Ok(hash) = ContentHash::from_file(raw_path) {
        metadata.insert("content_hash".to_string(), hash.to_prefixed_hex());
    }
    metadata
}

fn extension_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let name = path.rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 4 {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReelConfig;
    use crate::descriptor::{AudioParams, ImageParams};
    use crate::pricing::{AutoConfirm, PricingTable};
    use crate::transport::{MockTransport, Transport};
    use std::path::PathBuf;

    /// Submits through the mock but serves undecodable bytes for image
    /// downloads, so normalization fails after a successful generation
    struct CorruptImageBytes(MockTransport);

    impl Transport for CorruptImageBytes {
        fn post_json(
            &self,
            url: &str,
            payload: &serde_json::Value,
        ) -> reelforge_core::Result<serde_json::Value> {
            self.0.post_json(url, payload)
        }

        fn get_bytes(&self, url: &str) -> reelforge_core::Result<Vec<u8>> {
            if url.ends_with(".png") {
                Ok(b"definitely not a png".to_vec())
            } else {
                self.0.get_bytes(url)
            }
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "reelforge_batch_test_{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn image_descriptor(id: &str, name: &str) -> AssetDescriptor {
        let mut d = AssetDescriptor::new(
            id,
            name,
            "wide shot of a garage workshop",
            "fal-ai/flux/dev",
            Modality::Image,
        );
        d.image = Some(ImageParams {
            width: 64,
            height: 64,
        });
        d
    }

    fn audio_descriptor(id: &str, name: &str) -> AssetDescriptor {
        let mut d = AssetDescriptor::new(
            id,
            name,
            "upbeat synth theme",
            "fal-ai/stable-audio",
            Modality::Audio,
        );
        d.audio = Some(AudioParams { duration: 20.0 });
        d
    }

    fn run(
        queue: &[AssetDescriptor],
        mock: MockTransport,
        confirm: bool,
        pricing: PricingTable,
        threshold: f64,
        dir: &Path,
    ) -> (BatchOutcome, ManifestTracker) {
        let config = ReelConfig::default();
        let client = GenerationClient::with_transport(Box::new(mock), &config);
        let mut prompt = AutoConfirm(confirm);
        let mut guard = CostGuard::new(pricing, threshold, &mut prompt);
        let mut tracker = ManifestTracker::new();
        let outcome = run_batch(
            queue,
            &client,
            &mut guard,
            &config.output,
            dir,
            &mut tracker,
        )
        .unwrap();
        (outcome, tracker)
    }

    #[test]
    fn test_two_item_run_with_one_failure() {
        let dir = temp_dir();
        let queue = vec![
            image_descriptor("a", "Intro Background"),
            audio_descriptor("b", "Theme Song"),
        ];
        let mock = MockTransport::new().fail_model("fal-ai/stable-audio");

        let (outcome, tracker) = run(
            &queue,
            mock,
            true,
            PricingTable::new(Default::default(), 0.0),
            0.5,
            &dir,
        );

        assert_eq!(outcome.summary.total, 2);
        assert_eq!(outcome.summary.succeeded, 1);
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.skipped, 0);
        assert_eq!(outcome.items[0].state, ItemState::Normalized);
        assert_eq!(outcome.items[1].state, ItemState::Failed);

        // Manifest holds exactly the successful entry
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.entries()[0].asset_id, "a");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_image_is_normalized_to_jpeg() {
        let dir = temp_dir();
        let queue = vec![image_descriptor("bg", "Ferrari Cart Morph")];

        let (outcome, tracker) = run(
            &queue,
            MockTransport::new(),
            true,
            PricingTable::new(Default::default(), 0.0),
            0.5,
            &dir,
        );

        assert_eq!(outcome.summary.succeeded, 1);
        let entry = &tracker.entries()[0];
        assert_eq!(entry.filename, "001_image_ferrari_cart_morph.jpg");

        let final_path = PathBuf::from(entry.local_path.as_ref().unwrap());
        assert!(final_path.exists());
        assert!(dir.join("raw").join("001_image_ferrari_cart_morph.png").exists());
        assert!(entry.metadata.contains_key("content_hash"));
        assert_eq!(entry.asset_type, "image");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_conversion_failure_keeps_entry_and_continues() {
        let dir = temp_dir();
        let queue = vec![
            image_descriptor("bg", "Intro Background"),
            audio_descriptor("theme", "Theme Song"),
        ];

        let config = ReelConfig::default();
        let client = GenerationClient::with_transport(
            Box::new(CorruptImageBytes(MockTransport::new())),
            &config,
        );
        let mut prompt = AutoConfirm(true);
        let mut guard = CostGuard::new(
            PricingTable::new(Default::default(), 0.0),
            0.5,
            &mut prompt,
        );
        let mut tracker = ManifestTracker::new();

        let outcome = run_batch(
            &queue,
            &client,
            &mut guard,
            &config.output,
            &dir,
            &mut tracker,
        )
        .unwrap();

        // The undecodable image fails at normalization; the batch moves on
        assert_eq!(outcome.items[0].state, ItemState::Failed);
        assert_eq!(outcome.items[1].state, ItemState::Succeeded);
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.succeeded, 1);

        // Generation itself succeeded, so the entry survives pointing at
        // the raw download, tagged with what went wrong
        assert_eq!(tracker.len(), 2);
        let entry = &tracker.entries()[0];
        assert_eq!(entry.asset_id, "bg");
        assert!(entry.metadata.contains_key("normalization_error"));
        let local = entry.local_path.as_ref().unwrap();
        assert!(local.contains("raw"));
        assert!(local.ends_with(".png"));
        assert!(!dir.join("001_image_intro_background.jpg").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cost_declined_skips_without_submission() {
        let dir = temp_dir();
        let queue = vec![image_descriptor("pricey", "Expensive Shot")];

        let mut models = std::collections::HashMap::new();
        models.insert("fal-ai/flux/dev".to_string(), 5.0);

        let (outcome, tracker) = run(
            &queue,
            MockTransport::new(),
            false,
            PricingTable::new(models, 0.0),
            0.5,
            &dir,
        );

        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.succeeded, 0);
        assert_eq!(outcome.items[0].state, ItemState::Skipped);
        assert!(tracker.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_duplicate_ids_are_fatal() {
        let dir = temp_dir();
        let queue = vec![
            image_descriptor("same", "One"),
            image_descriptor("same", "Two"),
        ];

        let config = ReelConfig::default();
        let client = GenerationClient::with_transport(Box::new(MockTransport::new()), &config);
        let mut prompt = AutoConfirm(true);
        let mut guard = CostGuard::new(
            PricingTable::new(Default::default(), 0.0),
            0.5,
            &mut prompt,
        );
        let mut tracker = ManifestTracker::new();

        let err = run_batch(
            &queue,
            &client,
            &mut guard,
            &config.output,
            &dir,
            &mut tracker,
        )
        .unwrap_err();
        assert!(err.is_fatal());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_audio_passthrough_no_normalization() {
        let dir = temp_dir();
        let queue = vec![audio_descriptor("theme", "Theme Song")];

        let (outcome, tracker) = run(
            &queue,
            MockTransport::new(),
            true,
            PricingTable::new(Default::default(), 0.0),
            0.5,
            &dir,
        );

        assert_eq!(outcome.items[0].state, ItemState::Succeeded);
        let entry = &tracker.entries()[0];
        assert_eq!(entry.filename, "001_audio_theme_song.mp3");
        assert!(dir.join("001_audio_theme_song.mp3").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_from_url("https://cdn.x/abc/result.PNG?sig=1"),
            Some("png".to_string())
        );
        assert_eq!(extension_from_url("https://cdn.x/no-extension"), None);
        assert_eq!(extension_from_url("https://cdn.x/.hidden"), None);
    }
}
