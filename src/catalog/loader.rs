/// Image decoding for display and statistics
///
/// Only the displayed image is kept decoded. The file is read and closed
/// inside `load`, so no handle outlives the call.

use image::RgbImage;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// A decoded image ready for the canvas and the statistics pass
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixels: RgbImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGBA bytes for the GUI image widget
    pub fn rgba_bytes(&self) -> Vec<u8> {
        image::DynamicImage::ImageRgb8(self.pixels.clone())
            .into_rgba8()
            .into_raw()
    }
}

/// Decode an image file into 8-bit RGB
pub fn load(path: &Path) -> Result<LoadedImage> {
    let pixels = image::open(path)?.into_rgb8();
    debug!(
        "Loaded {} ({}x{})",
        path.display(),
        pixels.width(),
        pixels.height()
    );
    Ok(LoadedImage { pixels })
}
