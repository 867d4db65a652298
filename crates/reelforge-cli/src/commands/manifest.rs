//! `reelforge manifest` - inspect a saved run manifest

use anyhow::Result;
use reelforge_gen::ManifestDocument;
use std::path::Path;

pub fn run(path: &str) -> Result<()> {
    let doc = ManifestDocument::load(Path::new(path))?;

    println!("Manifest: {}", path);
    println!("  Started:   {}", doc.generation_timestamp);
    println!("  Completed: {}", doc.completion_timestamp);
    println!("  Assets:    {}", doc.total_assets);
    for entry in &doc.assets {
        println!(
            "    {} ({}) {}",
            entry.filename,
            entry.asset_type,
            entry
                .local_path
                .as_deref()
                .unwrap_or("<no local file>")
        );
    }

    Ok(())
}
