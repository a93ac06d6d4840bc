/// Capture timestamp resolution
///
/// Phenology cameras encode the capture time in the file name
/// (e.g. `harvard_2016_05_04_120001.jpg`). When the name carries no
/// usable date, the file's modification time is used instead.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use std::fs::Metadata;

use crate::state::data::TimestampSource;

/// Accepted year range for dates found in file names
const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 2100;

/// Resolve the capture time of a file from its stem, falling back to metadata
pub fn resolve(stem: &str, metadata: Option<&Metadata>) -> (Option<NaiveDateTime>, TimestampSource) {
    if let Some(date) = parse_filename(stem) {
        return (Some(date), TimestampSource::Filename);
    }
    if let Some(date) = metadata.and_then(modified_time) {
        return (Some(date), TimestampSource::Modified);
    }
    (None, TimestampSource::Unknown)
}

/// Parse a timestamp out of the digits of a file stem
///
/// All ASCII digits are concatenated, then scanned left to right for the first
/// 14-digit window that is a valid `YYYYMMDDHHMMSS`. If none is found, the first
/// 8-digit window that is a valid `YYYYMMDD` gives a date at midnight.
pub fn parse_filename(stem: &str) -> Option<NaiveDateTime> {
    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();

    let parsed = windows(&digits, 14)
        .filter_map(|w| NaiveDateTime::parse_from_str(w, "%Y%m%d%H%M%S").ok())
        .find(|d| year_ok(d.year()))
        .or_else(|| {
            windows(&digits, 8)
                .filter_map(|w| NaiveDate::parse_from_str(w, "%Y%m%d").ok())
                .find(|d| year_ok(d.year()))
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    parsed
}

fn windows(digits: &str, len: usize) -> impl Iterator<Item = &str> {
    let count = digits.len().saturating_sub(len - 1);
    (0..count).map(move |i| &digits[i..i + len])
}

fn year_ok(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

/// File modification time as local wall-clock time
fn modified_time(metadata: &Metadata) -> Option<NaiveDateTime> {
    let modified = metadata.modified().ok()?;
    let local: DateTime<Local> = modified.into();
    Some(local.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_phenocam_name() {
        assert_eq!(
            parse_filename("harvard_2016_05_04_120001"),
            Some(dt(2016, 5, 4, 12, 0, 1))
        );
    }

    #[test]
    fn test_compact_name() {
        assert_eq!(
            parse_filename("IMG_20160504_083015"),
            Some(dt(2016, 5, 4, 8, 30, 15))
        );
    }

    #[test]
    fn test_leading_site_digits_are_skipped() {
        assert_eq!(
            parse_filename("cam2_2016_05_04_120001"),
            Some(dt(2016, 5, 4, 12, 0, 1))
        );
    }

    #[test]
    fn test_date_only_name() {
        assert_eq!(parse_filename("site-2019-10-31"), Some(dt(2019, 10, 31, 0, 0, 0)));
    }

    #[test]
    fn test_unparseable_name() {
        assert_eq!(parse_filename("IMG_0001"), None);
        assert_eq!(parse_filename("snapshot"), None);
        assert_eq!(parse_filename("99999999999999"), None);
    }

    #[test]
    fn test_resolve_falls_back_to_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        std::fs::write(&path, b"x").unwrap();
        let metadata = std::fs::metadata(&path).unwrap();

        let (date, source) = resolve("IMG_0001", Some(&metadata));
        assert!(date.is_some());
        assert_eq!(source, TimestampSource::Modified);

        let (date, source) = resolve("IMG_0001", None);
        assert_eq!(date, None);
        assert_eq!(source, TimestampSource::Unknown);
    }
}
