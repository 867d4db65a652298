//! Reelforge CLI - batch media-asset generation for video production

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{manifest, markers, run};

#[derive(Parser)]
#[command(name = "reelforge")]
#[command(about = "Batch media-asset generation pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch from a TOML queue file
    Run {
        /// Path to the queue file
        queue: String,

        /// Output directory for generated assets
        #[arg(long, default_value = "build/assets")]
        output_dir: String,

        /// Path for the run manifest
        #[arg(long, default_value = "build/manifest.json")]
        manifest: String,

        /// Answer yes to every cost confirmation
        #[arg(long)]
        yes: bool,

        /// Fabricate results offline instead of calling the provider
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate chapter-marker cards from a timestamped text file
    Markers {
        /// Path to the marker file (one `MM:SS Title` per line)
        file: String,

        /// Image model for the title cards
        #[arg(long, default_value = "fal-ai/flux/dev")]
        model: String,

        /// Output directory for generated assets
        #[arg(long, default_value = "build/markers")]
        output_dir: String,

        /// Path for the run manifest
        #[arg(long, default_value = "build/markers_manifest.json")]
        manifest: String,

        /// Answer yes to every cost confirmation
        #[arg(long)]
        yes: bool,

        /// Fabricate results offline instead of calling the provider
        #[arg(long)]
        dry_run: bool,
    },

    /// Summarize a saved run manifest
    Manifest {
        /// Path to the manifest file
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            queue,
            output_dir,
            manifest,
            yes,
            dry_run,
        } => run::run(run::RunArgs {
            queue,
            output_dir,
            manifest,
            yes,
            dry_run,
        }),
        Commands::Markers {
            file,
            model,
            output_dir,
            manifest,
            yes,
            dry_run,
        } => markers::run(markers::MarkersArgs {
            file,
            model,
            output_dir,
            manifest,
            yes,
            dry_run,
        }),
        Commands::Manifest { path } => manifest::run(&path),
    }
}
