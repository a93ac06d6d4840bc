//! CSV summary export
//!
//! One row per image in session order. Columns are the identity and date
//! fields, the whole-image channel means, then one column per statistic and
//! ROI type (`canopy_B`, `sky_B`, ..., `soil_GCC`).

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::state::data::{ChannelMeans, ImageRecord};
use crate::state::roi::RoiType;
use crate::state::session::Session;

/// Fixed leading columns
const BASE_COLUMNS: [&str; 9] = [
    "Camera_id",
    "Directory",
    "Image_Name",
    "Date",
    "Processed",
    "new_ROI",
    "overall_B",
    "overall_R",
    "overall_G",
];

/// Per-ROI statistics, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    B,
    G,
    R,
    Gcc,
}

impl Stat {
    pub const ALL: [Stat; 4] = [Stat::B, Stat::G, Stat::R, Stat::Gcc];

    pub fn label(self) -> &'static str {
        match self {
            Stat::B => "B",
            Stat::G => "G",
            Stat::R => "R",
            Stat::Gcc => "GCC",
        }
    }

    fn value(self, means: &ChannelMeans) -> Option<f64> {
        match self {
            Stat::B => Some(means.b),
            Stat::G => Some(means.g),
            Stat::R => Some(means.r),
            Stat::Gcc => means.gcc(),
        }
    }
}

/// Full header row
pub fn header() -> Vec<String> {
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for stat in Stat::ALL {
        for roi in RoiType::ALL {
            columns.push(format!("{}_{}", roi.key(), stat.label()));
        }
    }
    columns
}

fn py_bool(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

fn number(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}

fn row(record: &ImageRecord, processed: bool) -> Vec<String> {
    let overall = record.stats.overall;
    let mut fields = vec![
        record.camera_id.clone(),
        record.directory(),
        record.name.clone(),
        record
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        py_bool(processed),
        py_bool(record.new_roi),
        number(overall.map(|m| m.b)),
        number(overall.map(|m| m.r)),
        number(overall.map(|m| m.g)),
    ];
    for stat in Stat::ALL {
        for roi in RoiType::ALL {
            fields.push(number(record.stats.roi(roi).and_then(|m| stat.value(&m))));
        }
    }
    fields
}

/// Write the summary of every image in the session to `writer`
pub fn write_csv<W: Write>(session: &Session, writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header())?;

    let mut rows = 0;
    for record in session.images() {
        csv.write_record(row(record, session.is_finalized(&record.name)))?;
        rows += 1;
    }
    csv.flush()?;
    Ok(rows)
}

/// Write the summary to a file, replacing any existing one
pub fn export_to_path(session: &Session, path: &Path) -> Result<usize> {
    let file = File::create(path)?;
    let rows = write_csv(session, file)?;
    info!("Saved {} rows to {}", rows, path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::state::data::{ImageStats, TimestampSource};
    use std::path::PathBuf;

    fn session(n: usize) -> Session {
        let records = (0..n)
            .map(|i| {
                ImageRecord::new(
                    format!("img{i}.jpg"),
                    PathBuf::from(format!("/cam/img{i}.jpg")),
                    crate::catalog::timestamp::parse_filename(&format!("2020_01_0{}_120000", i + 1)),
                    TimestampSource::Filename,
                    "cam".into(),
                )
            })
            .collect();
        Session::new(Catalog {
            directory: PathBuf::from("/cam"),
            camera_id: "cam".into(),
            records,
        })
    }

    fn read_back(session: &Session) -> (csv::StringRecord, Vec<csv::StringRecord>) {
        let mut buf = Vec::new();
        write_csv(session, &mut buf).unwrap();
        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers = reader.headers().unwrap().clone();
        let rows = reader.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn test_header_layout() {
        let columns = header();
        assert_eq!(columns.len(), 9 + Stat::ALL.len() * RoiType::COUNT);
        assert_eq!(&columns[..3], &["Camera_id", "Directory", "Image_Name"]);
        assert_eq!(columns[9], "canopy_B");
        assert_eq!(columns[10], "sky_B");
        assert_eq!(columns.last().unwrap(), "soil_GCC");
    }

    #[test]
    fn test_processed_flag_matches_finalized_set() {
        let mut s = session(3);
        s.finalize("img1.jpg").unwrap();

        let (headers, rows) = read_back(&s);
        let processed = headers.iter().position(|h| h == "Processed").unwrap();

        assert_eq!(rows.len(), 3);
        let flags: Vec<&str> = rows.iter().map(|r| &r[processed]).collect();
        assert_eq!(flags, vec!["False", "True", "False"]);
    }

    #[test]
    fn test_finalizing_every_image_exports_all_rows_processed() {
        let mut s = session(4);
        let names: Vec<String> = s.images().iter().map(|r| r.name.clone()).collect();

        let due: Vec<bool> = names
            .iter()
            .map(|name| s.finalize(name).unwrap().export_due)
            .collect();
        assert_eq!(due, vec![false, false, false, true]);
        assert!(!s.finalize(&names[0]).unwrap().export_due);

        let (headers, rows) = read_back(&s);
        let processed = headers.iter().position(|h| h == "Processed").unwrap();
        assert_eq!(rows.len(), s.len());
        assert!(rows.iter().all(|r| &r[processed] == "True"));
    }

    #[test]
    fn test_row_values() {
        let mut s = session(1);
        let mut stats = ImageStats {
            overall: Some(ChannelMeans { r: 1.0, g: 2.0, b: 3.0 }),
            ..Default::default()
        };
        stats.set_roi(RoiType::Sky, Some(ChannelMeans { r: 10.0, g: 20.0, b: 70.0 }));
        s.apply_stats("img0.jpg", stats).unwrap();

        let (headers, rows) = read_back(&s);
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        let row = &rows[0];

        assert_eq!(&row[col("Camera_id")], "cam");
        assert_eq!(&row[col("Directory")], "/cam");
        assert_eq!(&row[col("Date")], "2020-01-01 12:00:00");
        assert_eq!(&row[col("new_ROI")], "False");
        assert_eq!(&row[col("overall_B")], "3.0000");
        assert_eq!(&row[col("overall_R")], "1.0000");
        assert_eq!(&row[col("sky_B")], "70.0000");
        assert_eq!(&row[col("sky_GCC")], "0.2000");
        assert_eq!(&row[col("canopy_B")], "");
    }

    #[test]
    fn test_export_to_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(export_to_path(&session(1), &path).is_err());
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let rows = export_to_path(&session(2), &path).unwrap();
        assert_eq!(rows, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
