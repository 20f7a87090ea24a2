//! Hand-tuned calibrations for the brand photograph
//!
//! Each preset is an independent calibration attempt against the same source
//! photo. The fractions differ between presets and none of them is the
//! "correct" one; they are kept exactly as they were tuned.

use std::path::Path;
use crate::config::{ExtractionSettings, OutputSpec};
use crate::error::{Result, LogoError};
use crate::processor::ColorKey;
use crate::region::CropRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Generous crop with near-black background keyed out
    Cropped,
    /// Tight crop around the circular emblem, squared, plus a 512px copy
    Circle,
    /// Tighter emblem crop, squared, plus a 400px copy
    Final,
    /// Emblem including the lower ornament, plus a half-size web copy
    V2,
    /// Like v2 with the white strip above the emblem trimmed off
    V3,
}

impl Preset {
    pub const ALL: [Preset; 5] = [Preset::Cropped, Preset::Circle, Preset::Final, Preset::V2, Preset::V3];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Cropped => "cropped",
            Preset::Circle => "circle",
            Preset::Final => "final",
            Preset::V2 => "v2",
            Preset::V3 => "v3",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Cropped => "generous crop, near-black background made transparent",
            Preset::Circle => "circular emblem on a square canvas, plus 512x512",
            Preset::Final => "tighter emblem on a square canvas, plus 400x400",
            Preset::V2 => "emblem with lower ornament, plus half-size web copy",
            Preset::V3 => "v2 without the white strip above, plus half-size web copy",
        }
    }

    pub fn region(&self) -> CropRegion {
        match self {
            Preset::Cropped => CropRegion::new(0.12, 0.58, 0.18, 0.82),
            Preset::Circle => CropRegion::new(0.155, 0.42, 0.175, 0.825),
            Preset::Final => CropRegion::new(0.165, 0.405, 0.185, 0.815),
            Preset::V2 => CropRegion::new(0.155, 0.43, 0.16, 0.84),
            Preset::V3 => CropRegion::new(0.175, 0.425, 0.17, 0.83),
        }
    }

    /// Full settings with output files placed under `out_dir`
    pub fn settings(&self, out_dir: &Path) -> ExtractionSettings {
        let mut settings = ExtractionSettings::new(self.region());

        match self {
            Preset::Cropped => {
                settings.transparency = Some(ColorKey { threshold: 30 });
                settings.outputs = vec![OutputSpec::new(out_dir.join("brand-logo-cropped.png"))];
            }
            Preset::Circle => {
                settings.square_canvas = true;
                settings.outputs = vec![
                    OutputSpec::new(out_dir.join("brand-logo-circle.png")),
                    OutputSpec::resized(out_dir.join("brand-logo-512.png"), 512, 512),
                ];
            }
            Preset::Final => {
                settings.square_canvas = true;
                settings.outputs = vec![
                    OutputSpec::new(out_dir.join("brand-logo-final.png")),
                    OutputSpec::resized(out_dir.join("brand-logo-400.png"), 400, 400),
                ];
            }
            Preset::V2 => {
                settings.outputs = vec![
                    OutputSpec::new(out_dir.join("brand-logo-v2.png")),
                    OutputSpec::scaled(out_dir.join("brand-logo-web.png"), 0.5),
                ];
            }
            Preset::V3 => {
                settings.outputs = vec![
                    OutputSpec::new(out_dir.join("brand-logo-v3.png")),
                    OutputSpec::scaled(out_dir.join("brand-logo-final-web.png"), 0.5),
                ];
            }
        }

        settings
    }
}

impl std::str::FromStr for Preset {
    type Err = LogoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                LogoError::InvalidParameter(format!(
                    "unknown preset '{}' (expected one of {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}
