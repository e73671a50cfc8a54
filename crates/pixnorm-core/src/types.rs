//! Core data types flowing through the normalization pipeline.

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Edge length of every normalized output, in pixels.
pub const TARGET_SIZE: u32 = 300;

/// Padding color used around scaled content.
pub const FILL_COLOR: [u8; 3] = [255, 255, 255];

/// JPEG quality of every normalized output.
pub const JPEG_QUALITY: u8 = 90;

/// Extension of every normalized output.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// An upload as handed over by the request layer.
#[derive(Debug, Clone)]
pub struct RawUpload {
    /// Raw file bytes
    pub bytes: Vec<u8>,

    /// Filename declared by the client
    pub file_name: String,

    /// Size declared by the client (may differ from `bytes.len()`)
    pub declared_size: u64,

    /// Content type declared by the client, if any
    pub content_type: Option<String>,
}

impl RawUpload {
    /// Build an upload whose declared size is the byte length.
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        let declared_size = bytes.len() as u64;
        Self {
            bytes,
            file_name: file_name.into(),
            declared_size,
            content_type: None,
        }
    }

    /// Attach a declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Color mode of a source image, resolved once at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    /// Map the decoder's color type onto the closed set of modes.
    pub fn from_color_type(color: image::ColorType) -> Self {
        use image::ColorType::*;
        match color {
            L8 | L16 => Self::Luma,
            La8 | La16 => Self::LumaAlpha,
            Rgba8 | Rgba16 | Rgba32F => Self::Rgba,
            _ => Self::Rgb,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::LumaAlpha | Self::Rgba)
    }
}

/// Tone of a canonical image. Both tones use three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Color,
    /// All three channels are equal
    Grayscale,
}

/// Image width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// In-memory RGB pixel buffer with no alpha.
///
/// Owned by a single pipeline run; every stage consumes or borrows it and
/// returns a new value.
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    pub pixels: RgbImage,
    pub tone: Tone,
}

impl CanonicalImage {
    pub fn new(pixels: RgbImage, tone: Tone) -> Self {
        Self { pixels, tone }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }
}

/// A transformation applied to an upload, reported in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fit into a square of the given edge length
    Resize(u32),
    ConvertToGrayscale,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Resize(size) => write!(f, "resize_to_{size}x{size}"),
            Operation::ConvertToGrayscale => write!(f, "convert_to_grayscale"),
        }
    }
}

/// Outcome of one successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Filename declared by the client
    pub original_filename: String,

    /// Generated output identity
    pub processed_filename: String,

    /// Where the output was stored
    pub processed_path: PathBuf,

    pub original_size: Dimensions,

    pub processed_size: Dimensions,

    /// Size of the encoded output in bytes
    pub file_size_bytes: u64,

    /// Operation tags in the order they were applied
    pub processing_applied: Vec<String>,
}

/// A normalized output present in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFileRecord {
    pub file_name: String,

    pub path: PathBuf,

    pub created_at: DateTime<Utc>,

    pub size_bytes: u64,
}

/// What `inspect` reports about an upload without processing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,

    pub height: u32,

    pub color_mode: ColorMode,

    /// Detected format ("jpeg", "png", ...)
    pub format: String,

    pub size_bytes: u64,

    pub has_transparency: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_tags() {
        assert_eq!(Operation::Resize(300).to_string(), "resize_to_300x300");
        assert_eq!(
            Operation::ConvertToGrayscale.to_string(),
            "convert_to_grayscale"
        );
    }

    #[test]
    fn test_color_mode_mapping() {
        assert_eq!(
            ColorMode::from_color_type(image::ColorType::La8),
            ColorMode::LumaAlpha
        );
        assert_eq!(
            ColorMode::from_color_type(image::ColorType::Rgb16),
            ColorMode::Rgb
        );
        assert!(ColorMode::Rgba.has_alpha());
        assert!(!ColorMode::Luma.has_alpha());
    }

    #[test]
    fn test_raw_upload_declared_size() {
        let upload = RawUpload::new(vec![1, 2, 3], "a.png").with_content_type("image/png");
        assert_eq!(upload.declared_size, 3);
        assert_eq!(upload.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_color_mode_serializes_snake_case() {
        let json = serde_json::to_string(&ColorMode::LumaAlpha).unwrap();
        assert_eq!(json, "\"luma_alpha\"");
    }
}
