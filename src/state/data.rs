/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog, the session and the UI layer.

use chrono::NaiveDateTime;
use std::path::PathBuf;

use super::roi::{RoiCoords, RoiType};

/// Where an image's capture timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    /// Parsed from the digits in the file name
    Filename,
    /// File system modification time
    Modified,
    /// No usable timestamp; ordered after all dated images
    Unknown,
}

/// Annotation progress of a single image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Unannotated,
    Annotating,
    Finalized,
}

/// Mean channel values over a set of pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ChannelMeans {
    /// Green chromatic coordinate of the means, G / (R + G + B)
    pub fn gcc(&self) -> Option<f64> {
        let total = self.r + self.g + self.b;
        (total > 0.0).then(|| self.g / total)
    }
}

/// Color statistics derived from the image pixels and its polygons
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageStats {
    /// Whole-image channel means
    pub overall: Option<ChannelMeans>,
    /// Channel means inside each ROI polygon, indexed like `RoiType::ALL`
    pub rois: [Option<ChannelMeans>; RoiType::COUNT],
}

impl ImageStats {
    pub fn roi(&self, roi: RoiType) -> Option<ChannelMeans> {
        self.rois[roi.index()]
    }

    pub fn set_roi(&mut self, roi: RoiType, means: Option<ChannelMeans>) {
        self.rois[roi.index()] = means;
    }
}

/// Represents a single image in the session
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Path relative to the scanned directory, `/` separated. Unique per session.
    pub name: String,
    /// Full path to the image file
    pub path: PathBuf,
    /// Capture timestamp, if one could be determined
    pub date: Option<NaiveDateTime>,
    pub date_source: TimestampSource,
    /// Camera identifier, stamped again when the image is finalized
    pub camera_id: String,
    /// Polygon vertices per ROI type
    pub coords: RoiCoords,
    pub stats: ImageStats,
    /// Set when a vertex was added by a click during this session
    pub new_roi: bool,
    pub status: ImageStatus,
}

impl ImageRecord {
    pub fn new(
        name: String,
        path: PathBuf,
        date: Option<NaiveDateTime>,
        date_source: TimestampSource,
        camera_id: String,
    ) -> Self {
        Self {
            name,
            path,
            date,
            date_source,
            camera_id,
            coords: RoiCoords::new(),
            stats: ImageStats::default(),
            new_roi: false,
            status: ImageStatus::Unannotated,
        }
    }

    /// Directory containing the image file
    pub fn directory(&self) -> String {
        self.path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// Capture date and time split for display, empty when unknown
    pub fn date_time_strings(&self) -> (String, String) {
        match self.date {
            Some(date) => (
                date.format("%Y-%m-%d").to_string(),
                date.format("%H:%M:%S").to_string(),
            ),
            None => (String::new(), String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_gcc() {
        let means = ChannelMeans { r: 50.0, g: 100.0, b: 50.0 };
        assert_eq!(means.gcc(), Some(0.5));

        let black = ChannelMeans { r: 0.0, g: 0.0, b: 0.0 };
        assert_eq!(black.gcc(), None);
    }

    #[test]
    fn test_stats_by_roi() {
        let mut stats = ImageStats::default();
        let means = ChannelMeans { r: 1.0, g: 2.0, b: 3.0 };
        stats.set_roi(RoiType::Grass, Some(means));

        assert_eq!(stats.roi(RoiType::Grass), Some(means));
        assert_eq!(stats.roi(RoiType::Sky), None);
    }

    #[test]
    fn test_new_record_is_unannotated() {
        let date = NaiveDate::from_ymd_opt(2016, 5, 4)
            .unwrap()
            .and_hms_opt(12, 0, 1)
            .unwrap();
        let record = ImageRecord::new(
            "a.jpg".into(),
            PathBuf::from("/data/cam/a.jpg"),
            Some(date),
            TimestampSource::Filename,
            "cam".into(),
        );

        assert_eq!(record.status, ImageStatus::Unannotated);
        assert!(record.coords.is_empty());
        assert!(!record.new_roi);
        assert_eq!(record.directory(), "/data/cam");
        assert_eq!(
            record.date_time_strings(),
            ("2016-05-04".to_string(), "12:00:01".to_string())
        );
    }
}
