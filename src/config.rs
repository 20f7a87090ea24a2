//! Extraction settings and their JSON / command-line forms

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use crate::error::{Result, LogoError};
use crate::processor::{ColorKey, Resampling};
use crate::region::CropRegion;

// ============================================================================
// OUTPUTS
// ============================================================================

/// How an output is resized before it is written
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resize {
    /// Exact target dimensions (aspect ratio is not preserved)
    Exact { width: u32, height: u32 },
    /// Multiply both dimensions by `factor`, truncating
    Scale { factor: f64 },
}

/// Largest output accepted, in pixels (1 GiB of RGBA8)
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

fn check_output_size(w: u32, h: u32) -> Result<(u32, u32)> {
    if w == 0 || h == 0 {
        return Err(LogoError::InvalidParameter(format!(
            "resize target {}x{} has no area",
            w, h
        )));
    }
    if w as u64 * h as u64 > MAX_OUTPUT_PIXELS {
        return Err(LogoError::InvalidParameter(format!(
            "resize target {}x{} exceeds the {} pixel limit",
            w, h, MAX_OUTPUT_PIXELS
        )));
    }
    Ok((w, h))
}

impl Resize {
    /// Target dimensions for a `width` x `height` raster
    ///
    /// Fails on empty targets and on targets above `MAX_OUTPUT_PIXELS`, so
    /// nothing is allocated for them.
    pub fn target_size(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        match *self {
            Resize::Exact { width: w, height: h } => check_output_size(w, h),
            Resize::Scale { factor } => {
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(LogoError::InvalidParameter(format!(
                        "scale factor must be positive, got {}",
                        factor
                    )));
                }
                let w = width as f64 * factor;
                let h = height as f64 * factor;
                if w > u32::MAX as f64 || h > u32::MAX as f64 {
                    return Err(LogoError::InvalidParameter(format!(
                        "scaling {}x{} by {} overflows the image size range",
                        width, height, factor
                    )));
                }
                check_output_size(w as u32, h as u32)
            }
        }
    }
}

/// One file to write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Destination file; always PNG-encoded and overwritten if present
    pub path: PathBuf,
    /// Optional resize applied to this output only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<Resize>,
}

impl OutputSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), resize: None }
    }

    pub fn resized(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            resize: Some(Resize::Exact { width, height }),
        }
    }

    pub fn scaled(path: impl Into<PathBuf>, factor: f64) -> Self {
        Self {
            path: path.into(),
            resize: Some(Resize::Scale { factor }),
        }
    }
}

/// Parses `path`, `path@WIDTHxHEIGHT` or `path@xFACTOR`
impl FromStr for OutputSpec {
    type Err = LogoError;

    fn from_str(s: &str) -> Result<Self> {
        let Some((path, size)) = s.rsplit_once('@') else {
            if s.is_empty() {
                return Err(LogoError::InvalidParameter("empty output path".to_string()));
            }
            return Ok(OutputSpec::new(s));
        };

        if path.is_empty() {
            return Err(LogoError::InvalidParameter(format!("output '{}' has no path", s)));
        }

        let bad = || {
            LogoError::InvalidParameter(format!(
                "output '{}': expected PATH@WIDTHxHEIGHT or PATH@xFACTOR",
                s
            ))
        };

        if let Some(factor) = size.strip_prefix('x') {
            let factor: f64 = factor.parse().map_err(|_| bad())?;
            return Ok(OutputSpec::scaled(path, factor));
        }

        let (w, h) = size.split_once('x').ok_or_else(bad)?;
        let width: u32 = w.parse().map_err(|_| bad())?;
        let height: u32 = h.parse().map_err(|_| bad())?;
        Ok(OutputSpec::resized(path, width, height))
    }
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Everything one extraction run needs besides the source image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Crop rectangle as fractions of the source dimensions
    pub region: CropRegion,
    /// Color key applied after cropping (default: none)
    #[serde(default)]
    pub transparency: Option<ColorKey>,
    /// Center the crop on a transparent square canvas (default: false)
    #[serde(default)]
    pub square_canvas: bool,
    /// Files to write, in order
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
    /// Filter for resized outputs (default: lanczos3)
    #[serde(default)]
    pub filter: Resampling,
    /// Create missing parent directories before writing (default: false)
    #[serde(default)]
    pub create_dirs: bool,
}

impl ExtractionSettings {
    pub fn new(region: CropRegion) -> Self {
        Self {
            region,
            transparency: None,
            square_canvas: false,
            outputs: Vec::new(),
            filter: Resampling::default(),
            create_dirs: false,
        }
    }
}

/// On-disk configuration: settings plus an optional source path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(flatten)]
    pub settings: ExtractionSettings,
}

impl ConfigFile {
    const KEYS: [&'static str; 7] = [
        "input",
        "region",
        "transparency",
        "square_canvas",
        "outputs",
        "filter",
        "create_dirs",
    ];

    /// Top-level keys serde would silently drop
    pub fn unknown_keys(value: &serde_json::Value) -> Vec<String> {
        value
            .as_object()
            .map(|map| {
                map.keys()
                    .filter(|k| !Self::KEYS.contains(&k.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse a JSON config; unknown top-level keys are ignored with a warning
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        for key in Self::unknown_keys(&value) {
            log::warn!("Ignoring unknown config key '{}'", key);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Read a JSON config; relative paths inside it stay relative to the
    /// current directory, not the config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
