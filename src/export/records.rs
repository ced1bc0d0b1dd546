//! Flat record sets and their CSV form
//!
//! A record set is written as a header row `Tag,Timestamp,Value` followed by
//! one row per sample, in the order the rows were added.

use super::Result;
use crate::range::DateRange;
use crate::types::{DataPoint, TagPath, TagRecord};
use chrono::SecondsFormat;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column names of an export file
pub const RECORD_HEADER: [&str; 3] = ["Tag", "Timestamp", "Value"];

/// File name used when exporting the full tag list
pub const TAG_LIST_FILE_NAME: &str = "tag_list.csv";

/// Ordered rows of `(tag, timestamp, value)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    rows: Vec<TagRecord>,
}

impl RecordSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append the samples of one tag, keeping their order
    pub fn push_points(&mut self, tag: &str, points: Vec<DataPoint>) {
        self.rows
            .extend(points.into_iter().map(|p| TagRecord::from_point(tag, p)));
    }

    #[must_use]
    pub fn rows(&self) -> &[TagRecord] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write header and rows as CSV
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Csv` if writing fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(RECORD_HEADER)?;
        for row in &self.rows {
            let timestamp = row.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            let value = row.value.to_string();
            wtr.write_record([row.tag.as_str(), timestamp.as_str(), value.as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the record set to `path`, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

/// `<tag with '.' as '_'>_<start>_<end>.csv`
#[must_use]
pub fn single_export_name(tag: &TagPath, range: &DateRange) -> PathBuf {
    PathBuf::from(format!("{}_{}.csv", tag.file_stem(), range.file_label()))
}

/// `<tag list file stem>_<start>_<end>.csv`
#[must_use]
pub fn batch_export_name(tag_list_file: &Path, range: &DateRange) -> PathBuf {
    let stem = tag_list_file
        .file_stem()
        .map_or_else(|| "batch".to_string(), |s| s.to_string_lossy().into_owned());
    PathBuf::from(format!("{stem}_{}.csv", range.file_label()))
}
