//! Image decoding into the canonical RGB representation.
//!
//! The format is detected from the byte stream, never from the filename.
//! Alpha is blended onto the fill color here so no later stage ever sees a
//! transparent pixel.

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::{CanonicalImage, ColorMode, Tone, FILL_COLOR};

/// Formats the decoder accepts.
const SUPPORTED: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::WebP,
];

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an upload.
#[derive(Debug)]
pub struct DecodedImage {
    /// Canonical RGB pixels (alpha already resolved)
    pub image: CanonicalImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Mode of the source before normalization
    pub source_mode: ColorMode,
    pub width: u32,
    pub height: u32,
    /// Size of the encoded input in bytes
    pub file_size: u64,
    /// At least one source pixel was not fully opaque
    pub has_transparency: bool,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode on the calling thread.
    pub fn decode(&self, bytes: &[u8], file_name: &str) -> Result<DecodedImage, PipelineError> {
        Self::decode_sync(bytes, file_name, self.limits.max_image_dimension)
    }

    /// Decode on the blocking pool, bounded by the configured timeout.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<DecodedImage, PipelineError> {
        let name = file_name.to_string();
        let max_dim = self.limits.max_image_dimension;
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async move {
            tokio::task::spawn_blocking(move || Self::decode_sync(&bytes, &name, max_dim)).await
        })
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Internal {
                file_name: file_name.to_string(),
                stage: "decode".to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                file_name: file_name.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    fn decode_sync(
        bytes: &[u8],
        file_name: &str,
        max_dim: u32,
    ) -> Result<DecodedImage, PipelineError> {
        let corrupt = |message: String| PipelineError::CorruptImage {
            file_name: file_name.to_string(),
            message,
        };

        // Header pass: format and dimensions, before paying for the pixels.
        let reader = Self::reader(bytes).map_err(corrupt)?;
        let format = reader
            .format()
            .ok_or_else(|| corrupt("Unrecognized image format".to_string()))?;
        if !SUPPORTED.contains(&format) {
            return Err(corrupt(format!(
                "Unsupported image format: {}",
                format_to_string(format)
            )));
        }
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| corrupt(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(corrupt(format!("Zero-sized image ({}x{})", width, height)));
        }
        if width > max_dim || height > max_dim {
            return Err(PipelineError::DimensionsTooLarge {
                file_name: file_name.to_string(),
                width,
                height,
                max_dim,
            });
        }

        let decoded = Self::reader(bytes)
            .map_err(corrupt)?
            .decode()
            .map_err(|e| corrupt(e.to_string()))?;
        let source_mode = ColorMode::from_color_type(decoded.color());
        let (image, has_transparency) = canonicalize(decoded, source_mode);

        tracing::trace!(
            "Decoded {} as {} {}x{} ({:?})",
            file_name,
            format_to_string(format),
            width,
            height,
            source_mode
        );

        Ok(DecodedImage {
            image,
            format,
            source_mode,
            width,
            height,
            file_size: bytes.len() as u64,
            has_transparency,
        })
    }

    fn reader(bytes: &[u8]) -> Result<image::ImageReader<Cursor<&[u8]>>, String> {
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| format!("Cannot detect image format: {}", e))
    }
}

/// Resolve any decoded color type to opaque RGB.
///
/// Also reports whether any pixel carried alpha below 255. Some codecs (GIF)
/// always decode to RGBA, so the color type alone says nothing.
fn canonicalize(image: DynamicImage, mode: ColorMode) -> (CanonicalImage, bool) {
    if !mode.has_alpha() {
        return (CanonicalImage::new(image.to_rgb8(), Tone::Color), false);
    }
    let rgba = image.to_rgba8();
    let translucent = rgba.pixels().any(|p| p.0[3] < u8::MAX);
    let pixels = if translucent {
        composite_on_fill(&rgba)
    } else {
        DynamicImage::ImageRgba8(rgba).to_rgb8()
    };
    (CanonicalImage::new(pixels, Tone::Color), translucent)
}

/// Alpha-weighted blend of every pixel onto the fill color.
pub fn composite_on_fill(rgba: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        dst.0 = [
            blend(r, FILL_COLOR[0], a),
            blend(g, FILL_COLOR[1], a),
            blend(b, FILL_COLOR[2], a),
        ];
    }
    out
}

fn blend(channel: u8, background: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + background as u32 * (255 - a) + 127) / 255) as u8
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}
