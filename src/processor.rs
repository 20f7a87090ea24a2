//! In-memory raster operations for logo extraction
//!
//! Three operations, applied after cropping in this order:
//! 1. Color Keying - Make near-black pixels fully transparent
//! 2. Square Canvas - Center the crop on a transparent square
//! 3. Resampling - Resize to an output's target dimensions
//!
//! Every function works on `RgbaImage` data only; loading and saving live in
//! `pipeline`.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

// ============================================================================
// SETTINGS
// ============================================================================

/// Settings for color keying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorKey {
    /// Pixels whose R, G and B are all strictly below this become transparent (default: 30)
    pub threshold: u8,
}

impl Default for ColorKey {
    fn default() -> Self {
        Self { threshold: 30 }
    }
}

/// Interpolation filter used when an output is resized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl Resampling {
    pub const ALL: [Resampling; 5] = [
        Resampling::Nearest,
        Resampling::Triangle,
        Resampling::CatmullRom,
        Resampling::Gaussian,
        Resampling::Lanczos3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resampling::Nearest => "nearest",
            Resampling::Triangle => "triangle",
            Resampling::CatmullRom => "catmullrom",
            Resampling::Gaussian => "gaussian",
            Resampling::Lanczos3 => "lanczos3",
        }
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            Resampling::Nearest => FilterType::Nearest,
            Resampling::Triangle => FilterType::Triangle,
            Resampling::CatmullRom => FilterType::CatmullRom,
            Resampling::Gaussian => FilterType::Gaussian,
            Resampling::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl std::str::FromStr for Resampling {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Resampling::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| format!("unknown filter '{}' (expected one of nearest, triangle, catmullrom, gaussian, lanczos3)", s))
    }
}

// ============================================================================
// STEP 1: COLOR KEYING
// ============================================================================

/// Make near-black pixels fully transparent
///
/// A pixel is keyed when all three color channels are strictly below
/// `key.threshold`; only its alpha changes. Returns the number of pixels
/// whose alpha was set to 0 by this call.
///
/// Safe to re-apply: idempotent operation (no change on second application)
pub fn apply_color_key(img: &mut RgbaImage, key: &ColorKey) -> usize {
    let threshold = key.threshold;
    let mut keyed = 0;

    for pixel in img.pixels_mut() {
        if pixel[0] < threshold && pixel[1] < threshold && pixel[2] < threshold && pixel[3] != 0 {
            pixel[3] = 0;
            keyed += 1;
        }
    }

    keyed
}

// ============================================================================
// STEP 2: SQUARE CANVAS
// ============================================================================

/// Offset at which a `width` x `height` image sits centered in a square of `side`
///
/// `side` must be at least `max(width, height)`.
fn centered_offset(side: u32, width: u32, height: u32) -> (u32, u32) {
    debug_assert!(side >= width && side >= height, "square side {} smaller than {}x{}", side, width, height);
    ((side - width) / 2, (side - height) / 2)
}

/// Center `img` on a fully transparent square canvas
///
/// The side is `max(width, height)`. Pixels are copied as-is (no alpha
/// blending), so keyed pixels keep their RGB values.
pub fn embed_in_square(img: &RgbaImage) -> RgbaImage {
    let (width, height) = img.dimensions();
    let side = width.max(height);

    let mut canvas = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
    let (offset_x, offset_y) = centered_offset(side, width, height);

    image::imageops::replace(&mut canvas, img, offset_x as i64, offset_y as i64);

    canvas
}

// ============================================================================
// STEP 3: RESAMPLING
// ============================================================================

/// Resize to exactly `width` x `height`, ignoring the source aspect ratio
pub fn resample(img: &RgbaImage, width: u32, height: u32, filter: Resampling) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    image::imageops::resize(img, width, height, filter.filter_type())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) * 3 % 256) as u8, 255])
        })
    }

    #[test]
    fn test_color_key_threshold() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
        img.put_pixel(1, 0, Rgba([10, 10, 40, 255]));

        let keyed = apply_color_key(&mut img, &ColorKey { threshold: 30 });

        assert_eq!(keyed, 1);
        assert_eq!(*img.get_pixel(0, 0), Rgba([10, 10, 10, 0]));
        assert_eq!(*img.get_pixel(1, 0), Rgba([10, 10, 40, 255]));
    }

    #[test]
    fn test_color_key_is_strict() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([30, 0, 0, 255]));
        assert_eq!(apply_color_key(&mut img, &ColorKey { threshold: 30 }), 0);
        assert_eq!(img.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_color_key_idempotent() {
        let mut once = gradient(40, 30);
        apply_color_key(&mut once, &ColorKey::default());

        let mut twice = once.clone();
        let keyed_again = apply_color_key(&mut twice, &ColorKey::default());

        assert_eq!(keyed_again, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_color_key_keeps_rgb() {
        let original = gradient(40, 30);
        let mut keyed = original.clone();
        apply_color_key(&mut keyed, &ColorKey { threshold: 120 });

        for (before, after) in original.pixels().zip(keyed.pixels()) {
            assert_eq!(before.0[..3], after.0[..3]);
        }
    }

    #[test]
    fn test_embed_wide_image() {
        let img = gradient(7, 4);
        let square = embed_in_square(&img);

        assert_eq!(square.dimensions(), (7, 7));
        // (7 - 4) / 2 = 1
        for y in 0..4 {
            for x in 0..7 {
                assert_eq!(square.get_pixel(x, y + 1), img.get_pixel(x, y));
            }
        }
        for x in 0..7 {
            assert_eq!(*square.get_pixel(x, 0), Rgba([0, 0, 0, 0]));
            assert_eq!(*square.get_pixel(x, 5), Rgba([0, 0, 0, 0]));
            assert_eq!(*square.get_pixel(x, 6), Rgba([0, 0, 0, 0]));
        }
    }

    #[test]
    fn test_embed_tall_image() {
        let img = gradient(3, 10);
        let square = embed_in_square(&img);

        assert_eq!(square.dimensions(), (10, 10));
        let (ox, oy) = centered_offset(10, 3, 10);
        assert_eq!((ox, oy), (3, 0));
        assert_eq!(square.get_pixel(ox, 0), img.get_pixel(0, 0));
        assert_eq!(square.get_pixel(ox + 2, 9), img.get_pixel(2, 9));
        assert_eq!(square.get_pixel(2, 5)[3], 0);
        assert_eq!(square.get_pixel(6, 5)[3], 0);
    }

    #[test]
    fn test_centered_offset_floors() {
        assert_eq!(centered_offset(7, 7, 4), (0, 1));
        assert_eq!(centered_offset(9, 4, 9), (2, 0));
        assert_eq!(centered_offset(5, 5, 5), (0, 0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "smaller than")]
    fn test_centered_offset_rejects_small_side() {
        centered_offset(3, 4, 2);
    }

    #[test]
    fn test_embed_keeps_keyed_pixels_unblended() {
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([5, 6, 7, 255]));
        apply_color_key(&mut img, &ColorKey::default());
        let square = embed_in_square(&img);
        assert_eq!(*square.get_pixel(0, 1), Rgba([5, 6, 7, 0]));
    }

    #[test]
    fn test_resample_exact_size() {
        let img = gradient(650, 530);
        for (w, h) in [(512, 512), (325, 265), (1, 1), (900, 20)] {
            let resized = resample(&img, w, h, Resampling::Lanczos3);
            assert_eq!(resized.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_resampling_from_str() {
        assert_eq!("lanczos3".parse::<Resampling>().unwrap(), Resampling::Lanczos3);
        assert_eq!("Nearest".parse::<Resampling>().unwrap(), Resampling::Nearest);
        assert!("bicubic".parse::<Resampling>().is_err());
    }
}
