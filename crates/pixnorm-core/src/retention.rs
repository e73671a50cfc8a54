//! Retention: bound the number of stored outputs, oldest evicted first.

use serde::Serialize;

use crate::error::PipelineError;
use crate::storage::OutputStore;

/// Outcome of one retention pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionReport {
    /// Number of files deleted
    pub evicted: usize,

    /// Files kept after the pass (from the snapshot's point of view)
    pub remaining: usize,

    /// Files that should have been evicted but could not be, with the reason
    pub failures: Vec<(String, String)>,
}

/// Evict the oldest outputs until at most `max_files` remain.
///
/// Works on a single listing snapshot: files written after the snapshot was
/// taken are never candidates. A failed deletion is logged and recorded; the
/// remaining candidates are still processed.
pub fn enforce(store: &OutputStore, max_files: usize) -> Result<RetentionReport, PipelineError> {
    enforce_except(store, max_files, |_| false)
}

/// Like [`enforce`], but never evicts a file for which `keep` returns true.
///
/// `keep` is asked at deletion time, not at snapshot time. Kept files still
/// count toward the limit; the next-oldest candidate is evicted instead.
pub fn enforce_except<F>(
    store: &OutputStore,
    max_files: usize,
    keep: F,
) -> Result<RetentionReport, PipelineError>
where
    F: Fn(&str) -> bool,
{
    let snapshot = store.list()?;
    let excess = snapshot.len().saturating_sub(max_files);

    let mut report = RetentionReport {
        remaining: snapshot.len(),
        ..RetentionReport::default()
    };
    if excess == 0 {
        tracing::debug!(
            "Retention: {} files, limit {}, nothing to evict",
            snapshot.len(),
            max_files
        );
        return Ok(report);
    }

    let mut attempted = 0;
    for record in &snapshot {
        if attempted == excess {
            break;
        }
        if keep(&record.file_name) {
            tracing::debug!("Retention: {} is still in flight, skipping", record.file_name);
            continue;
        }
        attempted += 1;
        match store.remove(&record.file_name) {
            Ok(()) => {
                tracing::debug!("Evicted {}", record.file_name);
                report.evicted += 1;
                report.remaining -= 1;
            }
            Err(e) => {
                tracing::warn!("Failed to evict {}: {}", record.file_name, e);
                report.failures.push((record.file_name.clone(), e.to_string()));
            }
        }
    }

    tracing::info!(
        "Retention evicted {} of {} files (limit {})",
        report.evicted,
        snapshot.len(),
        max_files
    );
    Ok(report)
}
