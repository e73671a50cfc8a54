//! Fit-to-square resizing with centered padding.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::types::{CanonicalImage, FILL_COLOR};

/// Where the scaled content landed on the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Scaled content size for a `width x height` source fitted into `target`.
///
/// The limiting side becomes exactly `target`; the other side is floored and
/// never drops below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    let (w, h, t) = (width as u64, height as u64, target as u64);
    if w >= h {
        (target, ((h * t) / w).max(1) as u32)
    } else {
        (((w * t) / h).max(1) as u32, target)
    }
}

/// Scale `image` to fit a `target x target` square and pad it with the fill
/// color, centered. Offsets are floored, so odd remainders leave the extra
/// pixel on the right/bottom.
pub fn fit_to_square(image: &CanonicalImage, target: u32) -> (CanonicalImage, Placement) {
    let (sw, sh) = scaled_dimensions(image.width(), image.height(), target);

    let scaled = if (sw, sh) == (image.width(), image.height()) {
        image.pixels.clone()
    } else {
        imageops::resize(&image.pixels, sw, sh, FilterType::Lanczos3)
    };

    let placement = Placement {
        x: (target - sw) / 2,
        y: (target - sh) / 2,
        width: sw,
        height: sh,
    };

    let mut canvas = RgbImage::from_pixel(target, target, Rgb(FILL_COLOR));
    imageops::replace(&mut canvas, &scaled, placement.x as i64, placement.y as i64);

    tracing::trace!(
        "Fitted {}x{} into {}x{} at ({}, {})",
        image.width(),
        image.height(),
        sw,
        sh,
        placement.x,
        placement.y
    );

    (CanonicalImage::new(canvas, image.tone), placement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Tone, TARGET_SIZE};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> CanonicalImage {
        CanonicalImage::new(RgbImage::from_pixel(width, height, Rgb(color)), Tone::Color)
    }

    #[test]
    fn test_scaled_dimensions_landscape() {
        assert_eq!(scaled_dimensions(1920, 1080, 300), (300, 168));
    }

    #[test]
    fn test_scaled_dimensions_tall() {
        assert_eq!(scaled_dimensions(50, 400, 300), (37, 300));
    }

    #[test]
    fn test_scaled_dimensions_upscale_and_extremes() {
        assert_eq!(scaled_dimensions(10, 10, 300), (300, 300));
        assert_eq!(scaled_dimensions(3000, 1, 300), (300, 1));
        assert_eq!(scaled_dimensions(1, 3000, 300), (1, 300));
    }

    #[test]
    fn test_output_is_square() {
        for (w, h) in [(1920, 1080), (50, 400), (300, 300), (7, 3), (1, 1)] {
            let (out, _) = fit_to_square(&solid(w, h, [0, 0, 0]), TARGET_SIZE);
            assert_eq!((out.width(), out.height()), (TARGET_SIZE, TARGET_SIZE));
        }
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        for (w, h) in [(1920u32, 1080u32), (50, 400), (640, 480), (123, 457)] {
            let (_, p) = fit_to_square(&solid(w, h, [0, 0, 0]), TARGET_SIZE);
            let (long, short) = (w.max(h) as f64, w.min(h) as f64);
            let scaled_short = p.width.min(p.height) as f64;
            let expected = short * TARGET_SIZE as f64 / long;
            assert_eq!(p.width.max(p.height), TARGET_SIZE, "{w}x{h}");
            assert!(
                (scaled_short - expected).abs() <= 1.0,
                "{w}x{h} scaled to {}x{}",
                p.width,
                p.height
            );
        }
    }

    #[test]
    fn test_padding_symmetric() {
        for (w, h) in [(1920, 1080), (50, 400), (301, 300), (299, 100)] {
            let (_, p) = fit_to_square(&solid(w, h, [0, 0, 0]), TARGET_SIZE);
            let left = p.x;
            let right = TARGET_SIZE - p.x - p.width;
            let top = p.y;
            let bottom = TARGET_SIZE - p.y - p.height;
            assert!(left.abs_diff(right) <= 1);
            assert!(top.abs_diff(bottom) <= 1);
        }
    }

    #[test]
    fn test_tall_image_padded_left_and_right() {
        let (out, p) = fit_to_square(&solid(50, 400, [0, 0, 0]), TARGET_SIZE);
        assert_eq!(p, Placement { x: 131, y: 0, width: 37, height: 300 });

        assert_eq!(out.pixels.get_pixel(0, 150).0, FILL_COLOR);
        assert_eq!(out.pixels.get_pixel(299, 150).0, FILL_COLOR);
        assert_eq!(out.pixels.get_pixel(150, 150).0, [0, 0, 0]);
    }

    #[test]
    fn test_wide_image_padded_top_and_bottom() {
        let (out, p) = fit_to_square(&solid(1920, 1080, [200, 0, 0]), TARGET_SIZE);
        assert_eq!((p.x, p.y), (0, 66));
        assert_eq!(out.pixels.get_pixel(150, 10).0, FILL_COLOR);
        assert_eq!(out.pixels.get_pixel(150, 290).0, FILL_COLOR);
        assert_eq!(out.pixels.get_pixel(150, 150).0, [200, 0, 0]);
    }
}
