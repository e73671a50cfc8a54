//! Luminance conversion that keeps three channels.

use crate::types::{CanonicalImage, Tone};

/// ITU-R 601-2 luma of one RGB pixel, rounded.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Replace every pixel with its luma on all three channels.
pub fn to_grayscale(mut image: CanonicalImage) -> CanonicalImage {
    for pixel in image.pixels.pixels_mut() {
        let [r, g, b] = pixel.0;
        let y = luma(r, g, b);
        pixel.0 = [y, y, y];
    }
    image.tone = Tone::Grayscale;
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_all_channels_equal() {
        let pixels = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 99]));
        let gray = to_grayscale(CanonicalImage::new(pixels, Tone::Color));

        assert_eq!(gray.tone, Tone::Grayscale);
        assert_eq!((gray.width(), gray.height()), (16, 16));
        for p in gray.pixels.pixels() {
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[1], p.0[2]);
        }
    }

    #[test]
    fn test_green_brighter_than_red_brighter_than_blue() {
        let r = luma(255, 0, 0);
        let g = luma(0, 255, 0);
        let b = luma(0, 0, 255);
        assert!(g > r && r > b);
    }
}
