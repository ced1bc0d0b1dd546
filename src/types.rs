//! Core value types shared by the navigator, the export pipeline and the
//! query service adapter
//!
//! # Types
//!
//! - **`TagPath`**: A location in the tag hierarchy, one segment per level
//! - **`SampleValue`**: A scalar sample value as reported by the historian
//! - **`DataPoint`**: One `(timestamp, value)` pair returned for a tag
//! - **`TagRecord`**: A data point labelled with the tag it belongs to
//!
//! # Examples
//!
//! ```
//! use canary_browser::types::TagPath;
//!
//! let root = TagPath::root();
//! let site = root.child("Site");
//! let tag = site.child("Pump1");
//!
//! assert!(root.is_root());
//! assert_eq!(tag.to_string(), "Site.Pump1");
//! assert_eq!(TagPath::parse("Site.Pump1"), tag);
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Segment delimiter used by the historian
pub const PATH_DELIMITER: char = '.';

/// A location in the tag hierarchy
///
/// The empty path is the root of the namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagPath(Vec<String>);

impl TagPath {
    /// The root of the hierarchy
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a delimited path string, dropping empty segments
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(
            path.split(PATH_DELIMITER)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    /// Return a new path one level below this one
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Path string as sent to the historian, `None` for the root
    #[must_use]
    pub fn as_query(&self) -> Option<String> {
        if self.is_root() {
            None
        } else {
            Some(self.to_string())
        }
    }

    /// Path string with delimiters replaced, suitable for file names
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.0.join("_")
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                write!(f, "{PATH_DELIMITER}")?;
            }
            f.write_str(segment)?;
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for TagPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// A scalar sample value
///
/// Whole numbers that fit an `i64` are kept as integers so counters and
/// totals are written out digit for digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Null,
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

/// One sample returned by the historian for a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(rename = "t")]
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "v")]
    pub value: SampleValue,
}

impl DataPoint {
    #[must_use]
    pub const fn new(timestamp: DateTime<FixedOffset>, value: SampleValue) -> Self {
        Self { timestamp, value }
    }
}

/// One sample labelled with its tag
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
    pub tag: String,
    pub timestamp: DateTime<FixedOffset>,
    pub value: SampleValue,
}

impl TagRecord {
    /// Label a data point with the tag it was fetched for
    #[must_use]
    pub fn from_point(tag: &str, point: DataPoint) -> Self {
        Self {
            tag: tag.to_string(),
            timestamp: point.timestamp,
            value: point.value,
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
