pub mod config;
pub mod error;
pub mod pipeline;
pub mod presets;
pub mod processor;
pub mod region;

pub use config::{ConfigFile, ExtractionSettings, OutputSpec, Resize};
pub use error::{LogoError, Result};
pub use pipeline::{extract, extract_file, prepare, ExtractionResult, Prepared, WrittenOutput};
pub use presets::Preset;
pub use processor::{ColorKey, Resampling};
pub use region::{CropRegion, PixelBounds};
