/// Color statistics for annotated images
///
/// Aggregates channel means over the whole image and over each ROI polygon.
/// A pixel belongs to a polygon when its center lies inside it.

use image::RgbImage;

use crate::state::data::{ChannelMeans, ImageStats};
use crate::state::roi::{Polygon, RoiCoords};

#[derive(Default)]
struct Accumulator {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
}

impl Accumulator {
    fn add(&mut self, px: &image::Rgb<u8>) {
        self.r += u64::from(px[0]);
        self.g += u64::from(px[1]);
        self.b += u64::from(px[2]);
        self.count += 1;
    }

    fn means(&self) -> Option<ChannelMeans> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(ChannelMeans {
            r: self.r as f64 / n,
            g: self.g as f64 / n,
            b: self.b as f64 / n,
        })
    }
}

/// Compute whole-image and per-ROI statistics
pub fn compute(image: &RgbImage, coords: &RoiCoords) -> ImageStats {
    let mut overall = Accumulator::default();
    for px in image.pixels() {
        overall.add(px);
    }

    let mut stats = ImageStats {
        overall: overall.means(),
        ..Default::default()
    };
    for (roi, polygon) in coords.iter() {
        stats.set_roi(roi, polygon_means(image, polygon));
    }
    stats
}

/// Channel means inside one polygon, `None` when it covers no pixel
pub fn polygon_means(image: &RgbImage, polygon: &Polygon) -> Option<ChannelMeans> {
    if polygon.len() < 3 {
        return None;
    }

    // Only scan the polygon's bounding box, clamped to the image
    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for p in &polygon.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(image.width());
    let y1 = (max_y.ceil().max(0.0) as u32).min(image.height());

    let mut acc = Accumulator::default();
    for y in y0..y1 {
        for x in x0..x1 {
            if polygon.contains(x as f32 + 0.5, y as f32 + 0.5) {
                acc.add(image.get_pixel(x, y));
            }
        }
    }
    acc.means()
}
