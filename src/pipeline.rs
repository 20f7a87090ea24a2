//! Logo extraction pipeline
//!
//! crop → color key → square canvas → (per output) resample → write PNG
//!
//! `prepare` runs the in-memory steps and hands back the raster every output
//! is derived from. `extract` adds output emission, and `extract_file` loads
//! the source first. The first failure aborts the run; outputs written before
//! it are left in place.

use image::RgbaImage;
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use crate::config::{ExtractionSettings, OutputSpec};
use crate::error::{Result, LogoError};
use crate::processor;
use crate::region::{self, PixelBounds};

/// Raster produced by the in-memory steps, before any output is written
#[derive(Debug, Clone)]
pub struct Prepared {
    pub image: RgbaImage,
    pub source_size: (u32, u32),
    pub crop_bounds: PixelBounds,
    pub keyed_pixels: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenOutput {
    pub path: PathBuf,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub source_size: (u32, u32),
    pub crop_bounds: PixelBounds,
    pub keyed_pixels: usize,
    /// Size of the raster outputs are derived from (after the square canvas)
    pub final_size: (u32, u32),
    pub outputs: Vec<WrittenOutput>,
}

// ============================================================================
// LOADING
// ============================================================================

/// Load an image from disk as RGBA8
///
/// Sources without an alpha channel get a fully opaque one.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| LogoError::Decode {
        origin: path.display().to_string(),
        source: e,
    })?;
    Ok(img.to_rgba8())
}

/// Decode an in-memory encoded image as RGBA8
pub fn load_image_from_memory(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|e| LogoError::Decode {
        origin: format!("<{} bytes in memory>", bytes.len()),
        source: e,
    })?;
    Ok(img.to_rgba8())
}

// ============================================================================
// IN-MEMORY STEPS
// ============================================================================

/// Crop, key and square `source` according to `settings`
///
/// `source` is never modified; every step works on a new raster.
pub fn prepare(source: &RgbaImage, settings: &ExtractionSettings) -> Result<Prepared> {
    let source_size = source.dimensions();

    let (mut image, crop_bounds) = region::crop(source, &settings.region)?;
    log::info!(
        "Cropped {}x{} source to {}x{}",
        source_size.0, source_size.1, crop_bounds.width(), crop_bounds.height()
    );

    let keyed_pixels = match &settings.transparency {
        Some(key) => {
            let keyed = processor::apply_color_key(&mut image, key);
            log::debug!("Color key < {} made {} pixels transparent", key.threshold, keyed);
            keyed
        }
        None => 0,
    };

    if settings.square_canvas {
        image = processor::embed_in_square(&image);
        log::debug!("Embedded crop in {}x{} square canvas", image.width(), image.height());
    }

    Ok(Prepared {
        image,
        source_size,
        crop_bounds,
        keyed_pixels,
    })
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Encode image as PNG bytes
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(LogoError::Encode)?;
    Ok(buffer.into_inner())
}

/// Write `img` to `path` as PNG, replacing any existing file
pub fn save_png(img: &RgbaImage, path: &Path, create_dirs: bool) -> Result<()> {
    let write_err = |source| LogoError::Write {
        path: path.to_path_buf(),
        source,
    };

    if create_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let bytes = encode_png(img)?;
    std::fs::write(path, bytes).map_err(write_err)?;
    Ok(())
}

/// Resample (if requested) and write one output
pub fn emit_output(img: &RgbaImage, output: &OutputSpec, settings: &ExtractionSettings) -> Result<WrittenOutput> {
    let (width, height) = img.dimensions();

    let size = match &output.resize {
        Some(resize) => {
            let (target_w, target_h) = resize.target_size(width, height)?;
            let resized = processor::resample(img, target_w, target_h, settings.filter);
            save_png(&resized, &output.path, settings.create_dirs)?;
            (target_w, target_h)
        }
        None => {
            save_png(img, &output.path, settings.create_dirs)?;
            (width, height)
        }
    };

    log::info!("Saved {}x{}: {}", size.0, size.1, output.path.display());

    Ok(WrittenOutput {
        path: output.path.clone(),
        size,
    })
}

// ============================================================================
// MAIN ENTRY POINTS
// ============================================================================

/// Run the whole pipeline on an already loaded image
pub fn extract(source: &RgbaImage, settings: &ExtractionSettings) -> Result<ExtractionResult> {
    let prepared = prepare(source, settings)?;

    let mut outputs = Vec::with_capacity(settings.outputs.len());
    for output in &settings.outputs {
        outputs.push(emit_output(&prepared.image, output, settings)?);
    }

    Ok(ExtractionResult {
        source_size: prepared.source_size,
        crop_bounds: prepared.crop_bounds,
        keyed_pixels: prepared.keyed_pixels,
        final_size: prepared.image.dimensions(),
        outputs,
    })
}

/// Load `input_path` and run the whole pipeline on it
pub fn extract_file(input_path: &Path, settings: &ExtractionSettings) -> Result<ExtractionResult> {
    let source = load_image(input_path)?;
    log::info!(
        "Loaded {} ({}x{})",
        input_path.display(),
        source.width(),
        source.height()
    );
    extract(&source, settings)
}

// ============================================================================
// TESTS
// ============================================================================
