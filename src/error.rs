//! Error types for the annotator

use std::path::PathBuf;
use thiserror::Error;

/// Result type used across the annotator
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// File system access failed (directory scan, export destination)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An image file could not be opened or decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Writing the CSV summary failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The settings file is not valid TOML
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// The session has no image with this name
    #[error("Unknown image: {0}")]
    UnknownImage(String),

    /// The chosen directory contains no images with an accepted extension
    #[error("No images found in {}", .0.display())]
    EmptyDirectory(PathBuf),
}
