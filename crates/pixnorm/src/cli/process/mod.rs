//! The `pixnorm process` command for normalizing images.

mod batch;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use pixnorm_core::{
    Config, FileDiscovery, ImageProcessor, OutputFormat as CoreOutputFormat, OutputWriter,
    ProcessingResult,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use batch::{process_batch, BatchOutcome};

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image files or directories to process
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of images processed concurrently (defaults to the configured worker count)
    #[arg(short, long)]
    pub parallel: Option<usize>,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    check_inputs(&args.inputs)?;
    let processor = Arc::new(ImageProcessor::new(&config)?);
    let discovery = FileDiscovery::new(config.processing.clone());

    let files: Vec<_> = args
        .inputs
        .iter()
        .flat_map(|input| discovery.discover(input))
        .collect();
    if files.is_empty() {
        tracing::warn!("No supported images found in {:?}", args.inputs);
        return Ok(());
    }

    let format = match args.format {
        Some(format) => CoreOutputFormat::from(format),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json),
    };
    let parallel = args
        .parallel
        .unwrap_or(config.processing.parallel_workers)
        .max(1);

    tracing::info!(
        "Normalizing {} image(s) ({:.1} MB) to {} in {:?}",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0,
        super::describe_target(),
        processor.store().dir()
    );

    let single = files.len() == 1;
    let outcome = process_batch(
        Arc::clone(&processor),
        files,
        parallel,
        config.limits.max_file_size_bytes(),
    )
    .await?;

    write_results(&outcome.results, &args, format, config.output.pretty, single)?;
    report_failures(&outcome, single)
}

/// Every explicitly named input must exist.
fn check_inputs(inputs: &[PathBuf]) -> anyhow::Result<()> {
    let missing: Vec<_> = inputs.iter().filter(|p| !p.exists()).collect();
    match missing.as_slice() {
        [] => Ok(()),
        [path] => anyhow::bail!("Input not found: {}", path.display()),
        paths => anyhow::bail!("{} inputs not found, first: {}", paths.len(), paths[0].display()),
    }
}

/// Write results to `--output` or stdout.
///
/// A single input in JSON format is written as a bare object rather than a
/// one-element array.
fn write_results(
    results: &[ProcessingResult],
    args: &ProcessArgs,
    format: CoreOutputFormat,
    pretty: bool,
    single: bool,
) -> anyhow::Result<()> {
    if results.is_empty() {
        return Ok(());
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, format, pretty && args.output.is_none());

    match (single, results) {
        (true, [result]) => writer.write(result)?,
        _ => writer.write_all(results)?,
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    Ok(())
}

/// Turn failures into a non-zero exit.
fn report_failures(outcome: &BatchOutcome, single: bool) -> anyhow::Result<()> {
    match outcome.failures.as_slice() {
        [] => Ok(()),
        [(path, error)] if single => anyhow::bail!("{}: {}", path.display(), error),
        failures => anyhow::bail!(
            "{} of {} image(s) failed",
            failures.len(),
            failures.len() + outcome.results.len()
        ),
    }
}
