//! Tag list persistence
//!
//! A tag list file is a one-column CSV table with the header `Tag` and one tag
//! path per row. Tags are stored verbatim, so any list reads back exactly as
//! it was written.

use super::{ExportError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Header of the single tag-list column
pub const TAG_LIST_HEADER: &str = "Tag";

/// Ordered list of tag paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(Vec<String>);

impl TagList {
    #[must_use]
    pub const fn new(tags: Vec<String>) -> Self {
        Self(tags)
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for TagList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Write `list` as a `Tag` table
///
/// # Errors
///
/// Returns `ExportError::Csv` if writing fails.
pub fn persist_tag_list<W: Write>(list: &TagList, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([TAG_LIST_HEADER])?;
    for tag in list {
        wtr.write_record([tag.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a `Tag` table
///
/// Only the first column is used. Field values are kept as written; lines
/// with no fields at all are skipped, an empty tag must be quoted (`""`).
///
/// # Errors
///
/// Returns `ExportError::InvalidTagList` if the header is missing or is not
/// `Tag`, and `ExportError::Csv` if a row cannot be parsed.
pub fn load_tag_list<R: Read>(reader: R) -> Result<TagList> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = rdr.headers()?.get(0).map(str::to_string);
    match header.as_deref().map(str::trim) {
        Some(TAG_LIST_HEADER) => {}
        Some(other) => {
            return Err(ExportError::InvalidTagList(format!(
                "expected header '{TAG_LIST_HEADER}', found '{other}'"
            )));
        }
        None => {
            return Err(ExportError::InvalidTagList(format!(
                "missing '{TAG_LIST_HEADER}' header"
            )));
        }
    }

    let mut tags = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(tag) = record.get(0) {
            tags.push(tag.to_string());
        }
    }
    Ok(TagList(tags))
}

/// Write `list` to the file at `path`
///
/// # Errors
///
/// Returns `ExportError` if the file cannot be created or written.
pub fn save_tag_list(list: &TagList, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    persist_tag_list(list, file)
}

/// Read a tag list from the file at `path`
///
/// # Errors
///
/// Returns `ExportError` if the file cannot be opened or parsed.
pub fn read_tag_list(path: &Path) -> Result<TagList> {
    let file = File::open(path)?;
    load_tag_list(file)
}
