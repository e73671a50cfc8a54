//! Error types for the pixnorm normalization pipeline.
//!
//! Pipeline errors are split into client faults (the upload itself was bad)
//! and server faults (the upload was fine but we could not finish with it),
//! so a request layer can map them to distinct responses.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pixnorm operations.
#[derive(Error, Debug)]
pub enum PixnormError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, one variant per failure class.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Upload exceeds the configured size limit
    #[error("File too large: {file_name} ({size} bytes > {max} bytes)")]
    TooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    /// Extension or declared content type is not in the allow-list
    #[error("Unsupported format for {file_name}: {format}")]
    UnsupportedFormat { file_name: String, format: String },

    /// Bytes could not be parsed as an image of a supported format
    #[error("Corrupt image {file_name}: {message}")]
    CorruptImage { file_name: String, message: String },

    /// Decoded image is larger than the configured dimension limit
    #[error("Image too large: {file_name} ({width}x{height} > {max_dim})")]
    DimensionsTooLarge {
        file_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Decode did not finish in time
    #[error("Timeout in {stage} stage for {file_name} after {timeout_ms}ms")]
    Timeout {
        file_name: String,
        stage: String,
        timeout_ms: u64,
    },

    /// A pipeline worker died before producing a result
    #[error("Internal error in {stage} stage for {file_name}: {message}")]
    Internal {
        file_name: String,
        stage: String,
        message: String,
    },

    /// Pixel buffer was inconsistent after a successful decode/transform
    #[error("Encode failure: {0}")]
    EncodeFailure(String),

    /// Output could not be persisted
    #[error("Failed to write {path}: {source}")]
    StorageWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No stored output has the requested name
    #[error("Processed file not found: {name}")]
    NotFound { name: String },

    /// Listing or deleting stored outputs failed
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// True when the failure was caused by the upload itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::TooLarge { .. }
                | Self::UnsupportedFormat { .. }
                | Self::CorruptImage { .. }
                | Self::DimensionsTooLarge { .. }
                | Self::NotFound { .. }
        )
    }
}

/// Convenience type alias for pixnorm results.
pub type Result<T> = std::result::Result<T, PixnormError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        let too_large = PipelineError::TooLarge {
            file_name: "a.jpg".into(),
            size: 20,
            max: 10,
        };
        let corrupt = PipelineError::CorruptImage {
            file_name: "a.jpg".into(),
            message: "bad header".into(),
        };
        assert!(too_large.is_client_error());
        assert!(corrupt.is_client_error());
        assert!(PipelineError::NotFound { name: "x.jpg".into() }.is_client_error());
    }

    #[test]
    fn test_worker_failure_is_server_fault() {
        let err = PipelineError::Internal {
            file_name: "a.png".into(),
            stage: "decode".into(),
            message: "task panicked".into(),
        };
        assert!(!err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Internal error in decode stage for a.png: task panicked"
        );
    }

    #[test]
    fn test_server_errors() {
        let encode = PipelineError::EncodeFailure("dimension mismatch".into());
        let write = PipelineError::StorageWriteFailure {
            path: PathBuf::from("/out/x.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!encode.is_client_error());
        assert!(!write.is_client_error());
        assert!(write.to_string().contains("/out/x.jpg"));
    }
}
