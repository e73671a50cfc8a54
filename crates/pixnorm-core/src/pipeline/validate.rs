//! Upload validation before any decode work.
//!
//! Only metadata is inspected here: sizes, the declared filename and the
//! declared content type. Whether the bytes actually parse is the decoder's
//! concern.

use std::path::Path;

use crate::config::{LimitsConfig, ProcessingConfig};
use crate::error::PipelineError;
use crate::types::RawUpload;

/// Validates uploads against the configured limits and allow-lists.
pub struct Validator {
    max_bytes: u64,
    extensions: Vec<String>,
    content_types: Vec<String>,
}

impl Validator {
    /// Create a new validator with the given limits and allow-lists.
    pub fn new(limits: &LimitsConfig, processing: &ProcessingConfig) -> Self {
        Self {
            max_bytes: limits.max_file_size_bytes(),
            extensions: processing
                .supported_formats
                .iter()
                .map(|f| f.trim_start_matches('.').to_lowercase())
                .collect(),
            content_types: processing
                .supported_content_types
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
        }
    }

    /// Check an upload.
    ///
    /// Checks, in order:
    /// - declared size and actual length are within the limit
    /// - the filename carries an allowed extension
    /// - the declared content type, when present, is allowed
    pub fn validate(&self, upload: &RawUpload) -> Result<(), PipelineError> {
        let size = upload.declared_size.max(upload.bytes.len() as u64);
        if size > self.max_bytes {
            return Err(PipelineError::TooLarge {
                file_name: upload.file_name.clone(),
                size,
                max: self.max_bytes,
            });
        }

        let extension = Self::extension(&upload.file_name).ok_or_else(|| {
            PipelineError::UnsupportedFormat {
                file_name: upload.file_name.clone(),
                format: "missing extension".to_string(),
            }
        })?;
        if !self.extensions.contains(&extension) {
            return Err(PipelineError::UnsupportedFormat {
                file_name: upload.file_name.clone(),
                format: extension,
            });
        }

        if let Some(content_type) = &upload.content_type {
            let content_type = content_type.trim().to_lowercase();
            if !self.content_types.contains(&content_type) {
                return Err(PipelineError::UnsupportedFormat {
                    file_name: upload.file_name.clone(),
                    format: content_type,
                });
            }
        }

        Ok(())
    }

    fn extension(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(&LimitsConfig::default(), &ProcessingConfig::default())
    }

    #[test]
    fn test_accepts_supported_extensions() {
        let v = validator();
        for name in ["a.jpg", "a.JPEG", "a.png", "a.gif", "a.bmp", "a.webp"] {
            assert!(v.validate(&RawUpload::new(vec![0; 16], name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = validator()
            .validate(&RawUpload::new(vec![0; 16], "notes.txt"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { ref format, .. } if format == "txt"));
    }

    #[test]
    fn test_rejects_missing_extension() {
        let err = validator()
            .validate(&RawUpload::new(vec![0; 16], "upload"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_rejects_oversize_before_extension() {
        let mut upload = RawUpload::new(vec![0; 16], "huge.txt");
        upload.declared_size = 15 * 1024 * 1024;
        let err = validator().validate(&upload).unwrap_err();
        assert!(matches!(err, PipelineError::TooLarge { .. }));
    }

    #[test]
    fn test_actual_length_counts_even_if_declared_smaller() {
        let mut upload = RawUpload::new(vec![0; 11 * 1024 * 1024], "big.jpg");
        upload.declared_size = 10;
        let err = validator().validate(&upload).unwrap_err();
        assert!(matches!(err, PipelineError::TooLarge { .. }));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let upload = RawUpload::new(vec![0; 10 * 1024 * 1024], "edge.png");
        assert!(validator().validate(&upload).is_ok());
    }

    #[test]
    fn test_content_type_checked() {
        let v = validator();
        let ok = RawUpload::new(vec![0; 4], "a.png").with_content_type("IMAGE/PNG");
        assert!(v.validate(&ok).is_ok());

        let bad = RawUpload::new(vec![0; 4], "a.png").with_content_type("text/plain");
        assert!(matches!(
            v.validate(&bad),
            Err(PipelineError::UnsupportedFormat { .. })
        ));
    }
}
