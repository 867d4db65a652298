//! `reelforge run` - execute a batch from a queue file

use anyhow::Result;
use reelforge_gen::pricing::{AutoConfirm, ConfirmPrompt, CostGuard, PricingTable, StdinConfirm};
use reelforge_gen::queue::QueueSource;
use reelforge_gen::{
    run_batch, AssetDescriptor, GenerationClient, ManifestTracker, MockTransport, ReelConfig,
    TomlQueue,
};
use std::path::Path;

pub struct RunArgs {
    pub queue: String,
    pub output_dir: String,
    pub manifest: String,
    pub yes: bool,
    pub dry_run: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    let queue = TomlQueue::new(&args.queue).build_queue()?;
    execute_batch(
        queue,
        &args.output_dir,
        &args.manifest,
        args.yes,
        args.dry_run,
    )
}

/// Shared batch driver for `run` and `markers`.
///
/// Exits cleanly (Ok) even when some items fail; only fatal errors such as
/// a missing queue file or duplicate asset ids propagate as Err.
pub fn execute_batch(
    queue: Vec<AssetDescriptor>,
    output_dir: &str,
    manifest_path: &str,
    yes: bool,
    dry_run: bool,
) -> Result<()> {
    let config = ReelConfig::load()?;

    let client = if dry_run {
        println!("Dry run: using the offline mock provider");
        GenerationClient::with_transport(Box::new(MockTransport::new()), &config)
    } else {
        GenerationClient::from_config(&config)?
    };

    let mut stdin_prompt = StdinConfirm;
    let mut auto_prompt = AutoConfirm(true);
    let prompt: &mut dyn ConfirmPrompt = if yes {
        &mut auto_prompt
    } else {
        &mut stdin_prompt
    };

    let mut guard = CostGuard::new(
        PricingTable::from_config(&config.pricing),
        config.pricing.threshold,
        prompt,
    );

    let mut tracker = ManifestTracker::new();
    let outcome = run_batch(
        &queue,
        &client,
        &mut guard,
        &config.output,
        Path::new(output_dir),
        &mut tracker,
    )?;

    let saved = tracker.save_manifest(Path::new(manifest_path))?;
    println!("Manifest: {} ({} assets)", saved.display(), tracker.len());
    if outcome.summary.failed > 0 {
        eprintln!("warning: {} items failed", outcome.summary.failed);
    }

    Ok(())
}
