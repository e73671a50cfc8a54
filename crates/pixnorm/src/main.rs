//! pixnorm CLI - normalize uploaded images into 300x300 grayscale JPEGs.
//!
//! Every accepted image is fitted into a white-padded 300x300 square,
//! converted to grayscale and stored as a JPEG under a unique name in the
//! output directory.
//!
//! # Usage
//!
//! ```bash
//! # Normalize one image
//! pixnorm process photo.png
//!
//! # Normalize a directory, results as JSON Lines
//! pixnorm process ./uploads/ --format jsonl --output results.jsonl
//!
//! # Describe an image without storing anything
//! pixnorm inspect photo.png
//!
//! # Copy a stored output out of the output directory
//! pixnorm get processed_20240131_142501_3f9a0c1b22de.jpg -o out.jpg
//!
//! # Keep only the 100 newest outputs
//! pixnorm cleanup --max-files 100
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// pixnorm - normalize images to 300x300 grayscale JPEGs.
#[derive(Parser, Debug)]
#[command(name = "pixnorm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Override the configured output directory
    #[arg(long, global = true, env = "PIXNORM_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize images and store the results
    Process(cli::process::ProcessArgs),

    /// Describe an image without processing it
    Inspect(cli::inspect::InspectArgs),

    /// List stored outputs, newest first
    List,

    /// Fetch a stored output by name
    Get(cli::get::GetArgs),

    /// Evict the oldest stored outputs
    Cleanup(cli::cleanup::CleanupArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let mut config = match pixnorm_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixnorm config path`."
            );
            pixnorm_core::Config::default()
        }
    };
    if let Some(dir) = cli.output_dir {
        config.storage.output_dir = dir;
    }
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("pixnorm v{}", pixnorm_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Inspect(args) => cli::inspect::execute(args, config).await,
        Commands::List => cli::list::execute(config).await,
        Commands::Get(args) => cli::get::execute(args, config).await,
        Commands::Cleanup(args) => cli::cleanup::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
