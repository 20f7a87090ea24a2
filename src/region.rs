//! Crop regions expressed as fractions of the source image.
//!
//! A region is calibrated once against a photograph and then reused on any
//! resolution of it, so the four edges are stored as fractions in `[0, 1]`
//! and only converted to pixels against the actual image dimensions.
//! Conversion truncates (`floor(fraction * dimension)`) rather than rounds.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use crate::error::{Result, LogoError};

/// Rectangle in normalized image space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Top edge as a fraction of the image height
    pub top: f64,
    /// Bottom edge as a fraction of the image height
    pub bottom: f64,
    /// Left edge as a fraction of the image width
    pub left: f64,
    /// Right edge as a fraction of the image width
    pub right: f64,
}

/// Integer pixel bounds, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

impl CropRegion {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self { top, bottom, left, right }
    }

    fn check_fraction(name: &str, value: f64) -> Result<()> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(LogoError::InvalidRegion(format!(
                "{} must be a fraction in [0, 1], got {}",
                name, value
            )));
        }
        Ok(())
    }

    /// Convert to pixel bounds against a `width` x `height` image
    ///
    /// Fails if any fraction is outside `[0, 1]` or if the truncated
    /// rectangle has no area.
    pub fn to_bounds(&self, width: u32, height: u32) -> Result<PixelBounds> {
        Self::check_fraction("top", self.top)?;
        Self::check_fraction("bottom", self.bottom)?;
        Self::check_fraction("left", self.left)?;
        Self::check_fraction("right", self.right)?;

        let bounds = PixelBounds {
            left: (self.left * width as f64) as u32,
            top: (self.top * height as f64) as u32,
            right: (self.right * width as f64) as u32,
            bottom: (self.bottom * height as f64) as u32,
        };

        if bounds.left >= bounds.right || bounds.top >= bounds.bottom {
            return Err(LogoError::InvalidRegion(format!(
                "region {:?} is empty on a {}x{} image (left={}, right={}, top={}, bottom={})",
                self, width, height, bounds.left, bounds.right, bounds.top, bounds.bottom
            )));
        }

        Ok(bounds)
    }
}

/// Copy the region out of `img` into a new raster
pub fn crop(img: &RgbaImage, region: &CropRegion) -> Result<(RgbaImage, PixelBounds)> {
    let (width, height) = img.dimensions();
    let bounds = region.to_bounds(width, height)?;

    log::debug!(
        "Crop bounds on {}x{}: left={} top={} right={} bottom={}",
        width, height, bounds.left, bounds.top, bounds.right, bounds.bottom
    );

    let cropped = image::imageops::crop_imm(img, bounds.left, bounds.top, bounds.width(), bounds.height())
        .to_image();

    Ok((cropped, bounds))
}
