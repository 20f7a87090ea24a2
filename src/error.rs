use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogoError {
    #[error("Failed to decode {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid crop region: {0}")]
    InvalidRegion(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LogoError>;

// Serialized as a plain message inside the CLI's JSON report
impl serde::Serialize for LogoError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
