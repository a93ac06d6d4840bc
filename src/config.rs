/// Command line arguments and user settings
///
/// Settings live in `<config_dir>/pheno-annotator/config.toml`:
/// - Linux: ~/.config/pheno-annotator/config.toml
/// - macOS: ~/Library/Application Support/pheno-annotator/config.toml
/// - Windows: %APPDATA%\pheno-annotator\config.toml
///
/// Every field is optional; a missing file means defaults.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::CatalogOptions;
use crate::error::Result;
use crate::state::roi::RoiType;

/// Command line interface
#[derive(Parser, Debug, Default)]
#[command(name = "pheno-annotator")]
#[command(about = "Annotate regions of interest on phenology camera images", long_about = None)]
pub struct Args {
    /// Camera image directory (a folder picker opens when omitted)
    pub directory: Option<PathBuf>,

    /// Camera identifier (defaults to the directory name)
    #[arg(long)]
    pub camera_id: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// User settings loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Image file extensions picked up by the catalog
    pub extensions: Vec<String>,
    /// Radius of the vertex markers, in image pixels
    pub point_radius: f32,
    /// Width of polygon edges
    pub line_width: f32,
    /// ROI type selected when a session starts
    pub default_roi: RoiType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extensions: CatalogOptions::default().extensions,
            point_radius: 7.0,
            line_width: 2.0,
            default_roi: RoiType::Canopy,
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("pheno-annotator");
            path.push("config.toml");
            path
        })
    }

    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from a file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml(&text)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            extensions: self.extensions.clone(),
        }
    }
}
