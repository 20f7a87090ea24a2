//! Command-line front end for the logo extraction pipeline
//!
//! ```bash
//! # One of the built-in calibrations
//! logo-extract IMG_1933.png --preset circle --out-dir client/public
//!
//! # Explicit region, key out near-black, square it, two sizes
//! logo-extract photo.png --top 0.155 --bottom 0.42 --left 0.175 --right 0.825 \
//!     --threshold 30 --square --output logo.png --output logo-512.png@512x512
//!
//! # Settings from JSON, half-size copy
//! logo-extract --config logo.json --output web.png@x0.5
//! ```

use anyhow::Context;
use clap::Parser;
use logo_extract::{
    extract_file, ColorKey, ConfigFile, CropRegion, ExtractionSettings, LogoError, OutputSpec, Preset,
    Resampling,
};
use std::path::PathBuf;

/// Crop a logo out of a photograph, optionally key out its background and square it
#[derive(Parser, Debug)]
#[command(name = "logo-extract")]
#[command(version, about, long_about = None)]
struct Args {
    /// Source image (may come from --config instead)
    input: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in calibration (see --list-presets)
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Directory for preset output files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// List built-in presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Top edge as a fraction of the height
    #[arg(long)]
    top: Option<f64>,

    /// Bottom edge as a fraction of the height
    #[arg(long)]
    bottom: Option<f64>,

    /// Left edge as a fraction of the width
    #[arg(long)]
    left: Option<f64>,

    /// Right edge as a fraction of the width
    #[arg(long)]
    right: Option<f64>,

    /// Make pixels with R, G and B all below this value transparent
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Center the crop on a transparent square canvas
    #[arg(long)]
    square: bool,

    /// Output file: PATH, PATH@WIDTHxHEIGHT or PATH@xFACTOR (repeatable)
    #[arg(short, long = "output")]
    outputs: Vec<OutputSpec>,

    /// Resampling filter for resized outputs
    #[arg(long)]
    filter: Option<Resampling>,

    /// Create missing output directories
    #[arg(long)]
    create_dirs: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Merge config file, preset and command-line flags into one run
fn resolve(args: &Args) -> logo_extract::Result<(PathBuf, ExtractionSettings)> {
    let mut input = args.input.clone();

    let base = if let Some(path) = &args.config {
        let config = ConfigFile::load(path)?;
        input = input.or(config.input);
        Some(config.settings)
    } else {
        args.preset.map(|preset| preset.settings(&args.out_dir))
    };

    let edges = [args.top, args.bottom, args.left, args.right];
    let mut settings = match (base, edges) {
        (Some(mut settings), _) => {
            let region = &mut settings.region;
            region.top = args.top.unwrap_or(region.top);
            region.bottom = args.bottom.unwrap_or(region.bottom);
            region.left = args.left.unwrap_or(region.left);
            region.right = args.right.unwrap_or(region.right);
            settings
        }
        (None, [Some(top), Some(bottom), Some(left), Some(right)]) => {
            ExtractionSettings::new(CropRegion::new(top, bottom, left, right))
        }
        (None, _) => {
            return Err(LogoError::InvalidParameter(
                "no crop region: pass --top, --bottom, --left and --right, or use --preset/--config".to_string(),
            ));
        }
    };

    if let Some(threshold) = args.threshold {
        settings.transparency = Some(ColorKey { threshold });
    }
    if args.square {
        settings.square_canvas = true;
    }
    if !args.outputs.is_empty() {
        settings.outputs = args.outputs.clone();
    }
    if let Some(filter) = args.filter {
        settings.filter = filter;
    }
    if args.create_dirs {
        settings.create_dirs = true;
    }

    let input = input.ok_or_else(|| LogoError::InvalidParameter("no input image given".to_string()))?;

    if settings.outputs.is_empty() {
        log::warn!("No outputs configured; the image will be processed but nothing written");
    }

    Ok((input, settings))
}

fn list_presets() {
    for preset in Preset::ALL {
        let r = preset.region();
        println!(
            "{:<8} top={:<6} bottom={:<6} left={:<6} right={:<6} {}",
            preset.name(),
            r.top,
            r.bottom,
            r.left,
            r.right,
            preset.description()
        );
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if args.list_presets {
        list_presets();
        return Ok(());
    }

    let outcome = resolve(&args).and_then(|(input, settings)| extract_file(&input, &settings));

    if args.json {
        let report = match &outcome {
            Ok(result) => serde_json::to_value(result)?,
            Err(e) => serde_json::json!({ "error": e }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let result = outcome.context("logo extraction failed")?;
    log::info!(
        "Done: {} output(s) from {}x{} crop",
        result.outputs.len(),
        result.crop_bounds.width(),
        result.crop_bounds.height()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use logo_extract::Resize;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("logo-extract").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_explicit_region() {
        let args = parse(&[
            "photo.png", "--top", "0.1", "--bottom", "0.9", "--left", "0.2", "--right", "0.8",
            "--threshold", "30", "--square", "-o", "a.png", "-o", "b.png@64x64",
        ]);
        let (input, settings) = resolve(&args).unwrap();

        assert_eq!(input, PathBuf::from("photo.png"));
        assert_eq!(settings.region, CropRegion::new(0.1, 0.9, 0.2, 0.8));
        assert_eq!(settings.transparency, Some(ColorKey { threshold: 30 }));
        assert!(settings.square_canvas);
        assert_eq!(settings.outputs[1].resize, Some(Resize::Exact { width: 64, height: 64 }));
    }

    #[test]
    fn test_partial_region_without_base_fails() {
        let args = parse(&["photo.png", "--top", "0.1", "--bottom", "0.9"]);
        assert!(matches!(resolve(&args), Err(LogoError::InvalidParameter(_))));
    }

    #[test]
    fn test_preset_with_overrides() {
        let args = parse(&["photo.png", "--preset", "circle", "--out-dir", "public", "--left", "0.2", "--filter", "nearest"]);
        let (_, settings) = resolve(&args).unwrap();

        assert_eq!(settings.region.left, 0.2);
        assert_eq!(settings.region.top, 0.155);
        assert_eq!(settings.filter, Resampling::Nearest);
        assert_eq!(settings.outputs[0].path, PathBuf::from("public/brand-logo-circle.png"));
    }

    #[test]
    fn test_cli_outputs_replace_preset_outputs() {
        let args = parse(&["photo.png", "--preset", "final", "-o", "only.png"]);
        let (_, settings) = resolve(&args).unwrap();
        assert_eq!(settings.outputs, vec![OutputSpec::new("only.png")]);
    }

    #[test]
    fn test_missing_input_fails() {
        let args = parse(&["--preset", "v2"]);
        assert!(matches!(resolve(&args), Err(LogoError::InvalidParameter(_))));
    }

    #[test]
    fn test_input_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("logo.json");
        std::fs::write(
            &config,
            r#"{ "input": "src.png", "region": { "top": 0, "bottom": 1, "left": 0, "right": 1 }, "square_canvas": true }"#,
        )
        .unwrap();

        let args = parse(&["--config", config.to_str().unwrap()]);
        let (input, settings) = resolve(&args).unwrap();

        assert_eq!(input, PathBuf::from("src.png"));
        assert!(settings.square_canvas);
    }

    #[test]
    fn test_bad_output_spec_rejected_by_parser() {
        let argv = ["logo-extract", "photo.png", "-o", "x.png@huge"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_config_conflicts_with_preset() {
        let argv = ["logo-extract", "photo.png", "--config", "a.json", "--preset", "v3"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
