//! Pipeline orchestration - wires together all processing stages.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::retention::{self, RetentionReport};
use crate::storage::OutputStore;
use crate::types::{
    Dimensions, ImageInfo, Operation, ProcessedFileRecord, ProcessingResult, RawUpload,
    TARGET_SIZE,
};

use super::decode::{format_to_string, ImageDecoder};
use super::validate::Validator;
use super::{encode, grayscale, naming, report, resize};

/// The main image processor that orchestrates the full pipeline.
///
/// The only shared state is the set of outputs still in flight; share the
/// processor behind an `Arc` and call it from as many tasks as needed.
pub struct ImageProcessor {
    validator: Validator,
    decoder: ImageDecoder,
    store: OutputStore,
    max_files: usize,
    auto_cleanup: bool,
    in_flight: InFlight,
}

/// Names of outputs written but not yet handed back to their caller.
///
/// Retention never evicts these.
#[derive(Debug, Clone, Default)]
struct InFlight(Arc<Mutex<HashSet<String>>>);

impl InFlight {
    fn claim(&self, name: &str) -> InFlightGuard {
        self.names().insert(name.to_string());
        InFlightGuard {
            set: self.clone(),
            name: name.to_string(),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.names().contains(name)
    }

    fn names(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases its name when the owning request returns.
struct InFlightGuard {
    set: InFlight,
    name: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.names().remove(&self.name);
    }
}

impl ImageProcessor {
    /// Create a processor writing to the configured output directory.
    pub fn new(config: &Config) -> PipelineResult<Self> {
        let store = OutputStore::open(config.output_dir())?;
        Ok(Self::with_store(config, store))
    }

    /// Create a processor around an already opened store.
    pub fn with_store(config: &Config, store: OutputStore) -> Self {
        Self {
            validator: Validator::new(&config.limits, &config.processing),
            decoder: ImageDecoder::new(config.limits.clone()),
            store,
            max_files: config.retention.max_files,
            auto_cleanup: config.retention.auto_cleanup,
            in_flight: InFlight::default(),
        }
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// Run the full pipeline on one upload and store the result.
    pub async fn process(&self, upload: RawUpload) -> PipelineResult<ProcessingResult> {
        let start = std::time::Instant::now();
        let file_name = upload.file_name.clone();
        tracing::debug!("Processing: {:?}", file_name);

        // Validate
        self.validator.validate(&upload)?;
        tracing::trace!("  Validate: {:?}", start.elapsed());

        // Decode
        let decode_start = std::time::Instant::now();
        let decoded = self
            .decoder
            .decode_from_bytes(upload.bytes, &file_name)
            .await?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());
        let original = Dimensions::new(decoded.width, decoded.height);

        // Resize, grayscale, encode
        let transform_start = std::time::Instant::now();
        let canonical = decoded.image;
        let (encoded, processed, operations) = tokio::task::spawn_blocking(move || {
            let (fitted, _) = resize::fit_to_square(&canonical, TARGET_SIZE);
            let gray = grayscale::to_grayscale(fitted);
            let bytes = encode::encode(&gray)?;
            let operations = [Operation::Resize(TARGET_SIZE), Operation::ConvertToGrayscale];
            Ok::<_, PipelineError>((bytes, gray.dimensions(), operations))
        })
        .await
        .map_err(|e| PipelineError::EncodeFailure(format!("Task join error: {}", e)))??;
        tracing::trace!("  Transform: {:?}", transform_start.elapsed());

        // Name and store
        let write_start = std::time::Instant::now();
        let output_name = naming::generate_name(&file_name);
        let _claim = self.in_flight.claim(&output_name);
        let output_len = encoded.len() as u64;
        let store = self.store.clone();
        let record = tokio::task::spawn_blocking(move || store.write(&output_name, &encoded))
            .await
            .map_err(|e| PipelineError::StorageWriteFailure {
                path: self.store.dir().to_path_buf(),
                source: std::io::Error::other(e),
            })?
            .map_err(|e| {
                tracing::error!("Could not store output for {}: {}", file_name, e);
                e
            })?;
        tracing::trace!("  Write: {:?}", write_start.elapsed());

        let result = report::report(
            &file_name,
            original,
            processed,
            output_len,
            &operations,
            &record.path,
        );

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{} -> {})",
            file_name,
            start.elapsed(),
            original.width,
            original.height,
            result.processed_filename
        );

        if self.auto_cleanup {
            // Retention failures never fail the upload.
            if let Err(e) = self.cleanup(self.max_files).await {
                tracing::warn!("Automatic cleanup failed: {}", e);
            }
        }

        Ok(result)
    }

    /// Validate and decode an upload and describe it, without writing anything.
    pub async fn inspect(&self, upload: RawUpload) -> PipelineResult<ImageInfo> {
        self.validator.validate(&upload)?;
        let decoded = self
            .decoder
            .decode_from_bytes(upload.bytes, &upload.file_name)
            .await?;

        Ok(ImageInfo {
            width: decoded.width,
            height: decoded.height,
            color_mode: decoded.source_mode,
            format: format_to_string(decoded.format),
            size_bytes: decoded.file_size,
            has_transparency: decoded.has_transparency,
        })
    }

    /// Stored outputs, oldest first.
    pub async fn list_processed(&self) -> PipelineResult<Vec<ProcessedFileRecord>> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.list())
            .await
            .map_err(|e| PipelineError::Storage {
                path: self.store.dir().to_path_buf(),
                source: std::io::Error::other(e),
            })?
    }

    /// Contents of a stored output, `NotFound` if there is none by that name.
    pub async fn read_processed(&self, name: &str) -> PipelineResult<Vec<u8>> {
        let store = self.store.clone();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || store.read(&name))
            .await
            .map_err(|e| PipelineError::Storage {
                path: self.store.dir().to_path_buf(),
                source: std::io::Error::other(e),
            })?
    }

    /// Evict the oldest outputs until at most `max_files` remain.
    ///
    /// Outputs of `process` calls that have not returned yet are never evicted.
    pub async fn cleanup(&self, max_files: usize) -> PipelineResult<RetentionReport> {
        let store = self.store.clone();
        let in_flight = self.in_flight.clone();
        tokio::task::spawn_blocking(move || {
            retention::enforce_except(&store, max_files, |name| in_flight.contains(name))
        })
            .await
            .map_err(|e| PipelineError::Storage {
                path: self.store.dir().to_path_buf(),
                source: std::io::Error::other(e),
            })?
    }

    /// Retention limit from configuration.
    pub fn max_files(&self) -> usize {
        self.max_files
    }
}
