//! JPEG encoding of the final canvas.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::error::PipelineError;
use crate::types::{CanonicalImage, JPEG_QUALITY};

/// Encode the canvas as a baseline JPEG at the fixed quality.
///
/// A buffer whose length disagrees with its dimensions is an internal fault,
/// reported as `EncodeFailure` and never retried.
pub fn encode(image: &CanonicalImage) -> Result<Vec<u8>, PipelineError> {
    let (width, height) = (image.width(), image.height());
    let expected = width as usize * height as usize * 3;
    let raw = image.pixels.as_raw();
    if width == 0 || height == 0 || raw.len() != expected {
        let message = format!(
            "buffer of {} bytes does not match {}x{} RGB",
            raw.len(),
            width,
            height
        );
        tracing::error!("Refusing to encode: {}", message);
        return Err(PipelineError::EncodeFailure(message));
    }

    let mut out = Vec::with_capacity(expected / 8);
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode(raw, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| {
            tracing::error!("JPEG encoder failed: {}", e);
            PipelineError::EncodeFailure(e.to_string())
        })?;
    Ok(out)
}
