//! `reelforge markers` - chapter-marker card generation

use super::run::execute_batch;
use anyhow::Result;
use reelforge_gen::queue::QueueSource;
use reelforge_gen::MarkerQueue;

pub struct MarkersArgs {
    pub file: String,
    pub model: String,
    pub output_dir: String,
    pub manifest: String,
    pub yes: bool,
    pub dry_run: bool,
}

pub fn run(args: MarkersArgs) -> Result<()> {
    let queue = MarkerQueue::new(&args.file, &args.model).build_queue()?;
    if queue.is_empty() {
        println!("No well-formed markers in {}", args.file);
        return Ok(());
    }
    println!("Parsed {} markers from {}", queue.len(), args.file);
    execute_batch(
        queue,
        &args.output_dir,
        &args.manifest,
        args.yes,
        args.dry_run,
    )
}
