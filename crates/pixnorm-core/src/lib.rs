//! pixnorm core - image upload normalization library.
//!
//! Every accepted upload, whatever its format, color mode or aspect ratio,
//! comes out as a 300x300 JPEG (quality 90) whose three channels carry the
//! same luma value, stored under a collision-free name in a bounded output
//! directory.
//!
//! # Architecture
//!
//! ```text
//! bytes → Validate → Decode → Fit/Pad → Grayscale → Encode → Name + Store → Result
//!                                                     Retention ──┘ (on demand)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixnorm_core::{Config, ImageProcessor, RawUpload};
//!
//! #[tokio::main]
//! async fn main() -> pixnorm_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = ImageProcessor::new(&config)?;
//!
//!     let bytes = std::fs::read("photo.png")?;
//!     let result = processor.process(RawUpload::new(bytes, "photo.png")).await?;
//!     println!("Stored {}", result.processed_filename);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod retention;
pub mod storage;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, PixnormError, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{DiscoveredFile, FileDiscovery, ImageProcessor};
pub use retention::RetentionReport;
pub use storage::OutputStore;
pub use types::{
    CanonicalImage, ColorMode, Dimensions, ImageInfo, Operation, ProcessedFileRecord,
    ProcessingResult, RawUpload, Tone, FILL_COLOR, JPEG_QUALITY, TARGET_SIZE,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
