/// Image catalog
///
/// This module handles:
/// - Walking a camera directory for image files
/// - Resolving each file's capture timestamp (timestamp.rs)
/// - Ordering the images by capture time
/// - Decoding the displayed image (loader.rs)

pub mod loader;
pub mod timestamp;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::state::data::{ImageRecord, TimestampSource};

/// Options controlling which files the catalog picks up
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Accepted file extensions, compared case-insensitively, without the dot
    pub extensions: Vec<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "jpeg".to_string()],
        }
    }
}

impl CatalogOptions {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }
}

/// The images found in one camera directory, ordered by capture time
#[derive(Debug, Clone)]
pub struct Catalog {
    pub directory: PathBuf,
    /// Directory basename, used as the default camera identifier
    pub camera_id: String,
    pub records: Vec<ImageRecord>,
}

/// Camera identifier derived from the directory name
///
/// Relative forms such as `.` or `cam/..` are resolved first; a root with no
/// name falls back to the full path.
pub fn camera_id_for(directory: &Path) -> String {
    let resolved = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| resolved.to_string_lossy().to_string())
}

/// Scan `directory` recursively and build date-ordered image records
///
/// Entries that cannot be read are logged and skipped. Failing to read the
/// directory itself is an error, as is finding no image at all.
pub fn scan_directory(directory: &Path, options: &CatalogOptions) -> Result<Catalog> {
    info!("Scanning folder: {}", directory.display());

    // Surface an unreadable root as an error instead of an empty catalog
    std::fs::read_dir(directory)?;

    let camera_id = camera_id_for(directory);
    let mut records = Vec::new();

    for entry in WalkDir::new(directory)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !options.accepts(path) {
            continue;
        }

        let name = relative_name(directory, path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let metadata = entry.metadata().ok();
        let (date, source) = timestamp::resolve(&stem, metadata.as_ref());

        match source {
            TimestampSource::Filename => {}
            TimestampSource::Modified => {
                debug!("{}: no date in file name, using modification time", name)
            }
            TimestampSource::Unknown => warn!("{}: no usable timestamp, ordered last", name),
        }

        records.push(ImageRecord::new(
            name,
            path.to_path_buf(),
            date,
            source,
            camera_id.clone(),
        ));
    }

    if records.is_empty() {
        return Err(Error::EmptyDirectory(directory.to_path_buf()));
    }

    sort_by_date(&mut records);
    info!("Found {} images for camera '{}'", records.len(), camera_id);

    Ok(Catalog {
        directory: directory.to_path_buf(),
        camera_id,
        records,
    })
}

/// Stable sort by capture time; undated records go last in discovery order
pub fn sort_by_date(records: &mut [ImageRecord]) {
    records.sort_by(|a, b| match (a.date, b.date) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
