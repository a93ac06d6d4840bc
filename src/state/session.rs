use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::data::{ImageRecord, ImageStats, ImageStatus};
use super::roi::{Point, RoiCoords, RoiType};
use crate::catalog::Catalog;
use crate::error::{Error, Result};

/// What a click added to the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PointAdded {
    pub roi: RoiType,
    pub point: Point,
    /// Edge from the previous vertex, if there was one
    pub edge: Option<(Point, Point)>,
    /// Edge back to the first vertex when the click closed the polygon
    pub closing_edge: Option<(Point, Point)>,
}

/// Result of finalizing an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// False when the image had already been finalized
    pub newly_finalized: bool,
    /// True exactly once per session: when the last image gets finalized
    pub export_due: bool,
}

/// One annotation session over a camera directory
///
/// Owns the date-ordered images and all annotation progress. The UI holds
/// the session and hands it to each handler; nothing else mutates it.
#[derive(Debug)]
pub struct Session {
    directory: PathBuf,
    records: Vec<ImageRecord>,
    index: HashMap<String, usize>,
    finalized: HashSet<String>,
    selected_roi: Option<RoiType>,
    camera_id: String,
    /// Coordinates of the most recently finalized image
    template: Option<RoiCoords>,
    export_triggered: bool,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        let index = catalog
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();

        info!(
            "Session started for {} ({} images)",
            catalog.directory.display(),
            catalog.records.len()
        );

        Self {
            directory: catalog.directory,
            records: catalog.records,
            index,
            finalized: HashSet::new(),
            selected_roi: None,
            camera_id: catalog.camera_id,
            template: None,
            export_triggered: false,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Images in catalog order
    pub fn images(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, name: &str) -> Result<&ImageRecord> {
        self.index
            .get(name)
            .map(|&i| &self.records[i])
            .ok_or_else(|| Error::UnknownImage(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut ImageRecord> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.records[i]),
            None => Err(Error::UnknownImage(name.to_string())),
        }
    }

    pub fn is_finalized(&self, name: &str) -> bool {
        self.finalized.contains(name)
    }

    pub fn finalized_count(&self) -> usize {
        self.finalized.len()
    }

    pub fn selected_roi(&self) -> Option<RoiType> {
        self.selected_roi
    }

    pub fn set_selected_roi(&mut self, roi: RoiType) {
        self.selected_roi = Some(roi);
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    pub fn set_camera_id(&mut self, camera_id: String) {
        self.camera_id = camera_id;
    }

    pub fn template(&self) -> Option<&RoiCoords> {
        self.template.as_ref()
    }

    /// Append a vertex to the selected ROI type's polygon
    ///
    /// With `close` set the vertex is the last one and the polygon is closed
    /// back to its first vertex. The image is never finalized by this.
    /// Returns `None` when no ROI type is selected.
    pub fn add_point(&mut self, name: &str, point: Point, close: bool) -> Result<Option<PointAdded>> {
        let Some(roi) = self.selected_roi else {
            debug!("Click ignored, no ROI type selected");
            return Ok(None);
        };

        let record = self.get_mut(name)?;
        let polygon = &mut record.coords[roi];
        let edge = polygon.points.last().map(|&prev| (prev, point));
        polygon.push(point);

        let closing_edge = if close {
            polygon.closed = true;
            polygon
                .points
                .first()
                .filter(|_| polygon.len() > 1)
                .map(|&first| (point, first))
        } else {
            None
        };

        record.new_roi = true;
        if record.status == ImageStatus::Unannotated {
            record.status = ImageStatus::Annotating;
        }

        Ok(Some(PointAdded {
            roi,
            point,
            edge,
            closing_edge,
        }))
    }

    /// Remove every vertex of one ROI type; finalized status is untouched
    pub fn clear_roi(&mut self, name: &str, roi: RoiType) -> Result<()> {
        let record = self.get_mut(name)?;
        record.coords[roi].clear();
        debug!("Cleared {} on {}", roi, name);
        Ok(())
    }

    /// Store freshly computed statistics for an image
    pub fn apply_stats(&mut self, name: &str, stats: ImageStats) -> Result<()> {
        self.get_mut(name)?.stats = stats;
        Ok(())
    }

    /// Mark an image as done and make its coordinates the copy-forward template
    ///
    /// Finalizing again re-stamps the camera id and refreshes the template
    /// but never adds a second entry or requests a second export.
    pub fn finalize(&mut self, name: &str) -> Result<FinalizeOutcome> {
        let camera_id = self.camera_id.clone();
        let record = self.get_mut(name)?;
        record.camera_id = camera_id;
        record.status = ImageStatus::Finalized;
        let template = record.coords.clone();

        self.template = Some(template);
        let newly_finalized = self.finalized.insert(name.to_string());

        let export_due = !self.export_triggered && self.finalized.len() == self.records.len();
        if export_due {
            self.export_triggered = true;
            info!("All {} images finalized", self.records.len());
        }

        info!(
            "Finalized {} ({}/{})",
            name,
            self.finalized.len(),
            self.records.len()
        );

        Ok(FinalizeOutcome {
            newly_finalized,
            export_due,
        })
    }

    /// Replace an image's coordinates with a copy of the template
    ///
    /// Returns false, changing nothing, when no image has been finalized yet.
    pub fn copy_forward(&mut self, name: &str) -> Result<bool> {
        let Some(template) = self.template.clone() else {
            debug!("No finalized image to copy ROIs from");
            return Ok(false);
        };

        let record = self.get_mut(name)?;
        record.coords = template;
        if record.status == ImageStatus::Unannotated && !record.coords.is_empty() {
            record.status = ImageStatus::Annotating;
        }
        debug!("Copied previous ROIs onto {}", name);
        Ok(true)
    }
}
