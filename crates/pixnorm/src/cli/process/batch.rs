//! Batch processing: bounded concurrency with a progress bar.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixnorm_core::{DiscoveredFile, ImageProcessor, ProcessingResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::read_upload;

/// Results of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<ProcessingResult>,
    pub failures: Vec<(PathBuf, String)>,
}

/// Process files with at most `parallel` uploads in flight.
pub async fn process_batch(
    processor: Arc<ImageProcessor>,
    files: Vec<DiscoveredFile>,
    parallel: usize,
    max_bytes: u64,
) -> anyhow::Result<BatchOutcome> {
    let total = files.len() as u64;
    let progress = if total > 1 {
        create_progress_bar(total)?
    } else {
        indicatif::ProgressBar::hidden()
    };

    let semaphore = Arc::new(Semaphore::new(parallel));
    let mut tasks = JoinSet::new();
    for (index, file) in files.into_iter().enumerate() {
        let processor = Arc::clone(&processor);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let outcome = match read_upload(&file.path, file.size, max_bytes).await {
                Ok(upload) => processor.process(upload).await.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            (index, file.path, outcome)
        });
    }

    let mut succeeded: u64 = 0;
    let mut failed: u64 = 0;
    let mut written_bytes: u64 = 0;
    let mut ordered = Vec::with_capacity(total as usize);
    let start_time = Instant::now();

    while let Some(joined) = tasks.join_next().await {
        let (index, path, outcome) = joined?;
        match &outcome {
            Ok(result) => {
                succeeded += 1;
                written_bytes += result.file_size_bytes;
                tracing::debug!("{:?} -> {}", path, result.processed_filename);
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Failed: {:?} - {}", path, e);
            }
        }
        ordered.push((index, path, outcome));

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} img/sec", (succeeded + failed) as f64 / elapsed));
        }
    }
    progress.finish_and_clear();

    if total > 1 {
        print_summary(succeeded, failed, written_bytes, start_time.elapsed());
    }

    ordered.sort_by_key(|(index, _, _)| *index);
    let mut outcome = BatchOutcome::default();
    for (_, path, result) in ordered {
        match result {
            Ok(result) => outcome.results.push(result),
            Err(e) => outcome.failures.push((path, e)),
        }
    }
    Ok(outcome)
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )?
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    Ok(pb)
}

/// Print a formatted summary table after batch processing.
fn print_summary(succeeded: u64, failed: u64, output_bytes: u64, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { succeeded as f64 / secs } else { 0.0 };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", succeeded + failed);
    eprintln!("    Written:      {:>7.1} MB", output_bytes as f64 / 1_000_000.0);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
