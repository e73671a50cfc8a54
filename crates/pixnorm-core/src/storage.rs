//! Output storage: one flat directory of normalized JPEGs.
//!
//! Writes go to a hidden temp file in the same directory and are renamed into
//! place without clobbering, so readers and listings never see a partial
//! output. Listings only report files carrying the output name pattern, which
//! keeps in-flight temp files out of every snapshot.

use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::pipeline::naming::is_output_name;
use crate::types::ProcessedFileRecord;

/// Handle on the output directory.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Open the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| PipelineError::Storage {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Atomically store `bytes` under `name`.
    ///
    /// Fails with `StorageWriteFailure` if anything goes wrong, including a
    /// file of that name already existing. No temp file is left behind.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<ProcessedFileRecord, PipelineError> {
        let path = self.resolve(name)?;
        let fail = |source: std::io::Error| PipelineError::StorageWriteFailure {
            path: path.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".pixnorm-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(fail)?;
        tmp.write_all(bytes).map_err(fail)?;
        tmp.as_file().sync_all().map_err(fail)?;
        tmp.persist_noclobber(&path).map_err(|e| fail(e.error))?;

        tracing::debug!("Stored {} ({} bytes)", path.display(), bytes.len());
        self.record(name, &path).map_err(fail)
    }

    /// Snapshot of stored outputs, oldest first.
    pub fn list(&self) -> Result<Vec<ProcessedFileRecord>, PipelineError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| PipelineError::Storage {
            path: self.dir.clone(),
            source,
        })?;

        let mut records = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_output_name(&name) || !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            match self.record(&name, &entry.path()) {
                Ok(record) => records.push(record),
                // Removed between read_dir and stat.
                Err(e) => tracing::debug!("Skipping {}: {}", name, e),
            }
        }

        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });
        Ok(records)
    }

    /// Contents of one stored output.
    ///
    /// Unknown names, names outside the output pattern and names that could
    /// escape the directory all fail with `NotFound`.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, PipelineError> {
        let not_found = || PipelineError::NotFound {
            name: name.to_string(),
        };
        if !is_output_name(name) {
            return Err(not_found());
        }
        let path = self.resolve(name).map_err(|_| not_found())?;
        std::fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => not_found(),
            _ => PipelineError::Storage { path, source },
        })
    }

    /// Delete one stored output.
    pub fn remove(&self, name: &str) -> Result<(), PipelineError> {
        let path = self.resolve(name)?;
        std::fs::remove_file(&path).map_err(|source| PipelineError::Storage { path, source })
    }

    /// Path of a stored output. Names that could escape the directory are
    /// rejected.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, PipelineError> {
        let invalid = name.is_empty()
            || name == "."
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\');
        if invalid {
            return Err(PipelineError::Storage {
                path: self.dir.join(name),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid output name: {:?}", name),
                ),
            });
        }
        Ok(self.dir.join(name))
    }

    fn record(&self, name: &str, path: &Path) -> std::io::Result<ProcessedFileRecord> {
        let meta = std::fs::metadata(path)?;
        // Not every filesystem records birth time.
        let created = meta.created().or_else(|_| meta.modified())?;
        Ok(ProcessedFileRecord {
            file_name: name.to_string(),
            path: path.to_path_buf(),
            created_at: DateTime::<Utc>::from(created),
            size_bytes: meta.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn names(records: &[ProcessedFileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.file_name.as_str()).collect()
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/processed");
        let store = OutputStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }

    #[test]
    fn test_write_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();

        let record = store.write("processed_1_a.jpg", b"jpegbytes").unwrap();
        assert_eq!(record.size_bytes, 9);
        assert_eq!(std::fs::read(&record.path).unwrap(), b"jpegbytes");

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![record]);
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        store.write("processed_1_a.jpg", b"x").unwrap();

        let all: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_write_does_not_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        store.write("processed_1_a.jpg", b"first").unwrap();

        let err = store.write("processed_1_a.jpg", b"second").unwrap_err();
        assert!(matches!(err, PipelineError::StorageWriteFailure { .. }));
        assert_eq!(
            std::fs::read(dir.path().join("processed_1_a.jpg")).unwrap(),
            b"first"
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_list_orders_by_creation_and_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join(".pixnorm-abc.part"), b"partial").unwrap();

        for name in ["processed_c.jpg", "processed_a.jpg", "processed_b.jpg"] {
            store.write(name, b"x").unwrap();
            std::thread::sleep(Duration::from_millis(15));
        }

        let listed = store.list().unwrap();
        assert_eq!(
            names(&listed),
            vec!["processed_c.jpg", "processed_a.jpg", "processed_b.jpg"]
        );
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        store.write("processed_x.jpg", b"x").unwrap();

        store.remove("processed_x.jpg").unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(store.remove("processed_x.jpg").is_err());
    }

    #[test]
    fn test_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        store.write("processed_r.jpg", b"stored").unwrap();

        assert_eq!(store.read("processed_r.jpg").unwrap(), b"stored");
        for missing in ["processed_missing.jpg", "../processed_r.jpg", ".pixnorm-x.part"] {
            assert!(
                matches!(store.read(missing), Err(PipelineError::NotFound { .. })),
                "{missing:?}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        for bad in ["", "..", "../etc/passwd", "a/b.jpg", "a\\b.jpg"] {
            assert!(store.resolve(bad).is_err(), "{bad:?}");
        }
        assert!(store.resolve("processed_1.jpg").is_ok());
    }
}
