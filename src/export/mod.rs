//! Batch export pipeline
//!
//! The [`Exporter`] queries tags one at a time and flattens their samples into
//! a single [`RecordSet`], grouped by tag in list order. Within a tag, rows
//! keep the order the service returned them in.
//!
//! Two batch policies exist:
//!
//! - [`Exporter::export_many`] aborts on the first tag that fails
//! - [`Exporter::export_many_resilient`] records the failure and moves on
//!
//! # Examples
//!
//! ```no_run
//! use canary_browser::export::{Exporter, TagList};
//! use canary_browser::range::DateRange;
//! use canary_browser::service::{CanaryClient, ClientOptions, Credentials};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CanaryClient::new("historian", Credentials::default(), ClientOptions::default())?;
//! let exporter = Exporter::new(&client);
//!
//! let tags = TagList::new(vec!["Plant.Line1.Temp".into(), "Plant.Line1.Flow".into()]);
//! let range = DateRange::explicit("2024-01-01", "2024-01-08")?;
//! let records = exporter.export_many(&tags, &range)?;
//! records.write_csv(std::io::stdout())?;
//! # Ok(())
//! # }
//! ```

mod records;
mod taglist;

pub use records::{
    RECORD_HEADER, RecordSet, TAG_LIST_FILE_NAME, batch_export_name, single_export_name,
};
pub use taglist::{
    TAG_LIST_HEADER, TagList, load_tag_list, persist_tag_list, read_tag_list, save_tag_list,
};

use crate::range::DateRange;
use crate::service::{self, QueryService, ServiceError};
use crate::types::DataPoint;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Export pipeline errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// A service call outside a per-tag fetch failed
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Fetching one tag of a batch failed
    #[error("Failed to fetch '{tag}': {source}")]
    TagFetch {
        tag: String,
        #[source]
        source: ServiceError,
    },

    /// Writing or parsing CSV failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tag list file is not a `Tag` table
    #[error("Invalid tag list: {0}")]
    InvalidTagList(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// A tag that could not be fetched during a resilient batch
#[derive(Debug)]
pub struct TagFailure {
    pub tag: String,
    pub error: ServiceError,
}

/// Outcome of [`Exporter::export_many_resilient`]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Rows of every tag that was fetched
    pub records: RecordSet,
    /// Sample count per fetched tag, in list order
    pub counts: Vec<(String, usize)>,
    /// Tags that failed, in list order
    pub failures: Vec<TagFailure>,
}

impl BatchReport {
    /// Whether every tag was fetched
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failed_tags(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.tag.as_str()).collect()
    }
}

/// Sequential export over a query service
pub struct Exporter<'a, S: QueryService + ?Sized> {
    service: &'a S,
}

impl<'a, S: QueryService + ?Sized> Exporter<'a, S> {
    pub const fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Samples of `tag` within `range`; an empty result is not an error
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the fetch fails.
    pub fn fetch_range(&self, tag: &str, range: &DateRange) -> service::Result<Vec<DataPoint>> {
        debug!(tag, start = %range.start(), end = %range.end(), "fetch range");
        self.service.fetch_tag_data(tag, Some(range))
    }

    /// Rows for a single tag
    ///
    /// # Errors
    ///
    /// Returns `ExportError::TagFetch` if the fetch fails.
    pub fn export_single(&self, tag: &str, range: &DateRange) -> Result<RecordSet> {
        let points = self.fetch_range(tag, range).map_err(|source| ExportError::TagFetch {
            tag: tag.to_string(),
            source,
        })?;

        let mut records = RecordSet::new();
        records.push_points(tag, points);
        info!(tag, rows = records.len(), "exported tag");
        Ok(records)
    }

    /// Rows for every tag in `tags`, in list order
    ///
    /// Tags without samples contribute no rows.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::TagFetch` for the first tag that fails; nothing
    /// is returned for the tags fetched before it.
    pub fn export_many(&self, tags: &TagList, range: &DateRange) -> Result<RecordSet> {
        let mut records = RecordSet::new();
        for tag in tags {
            let points = self.fetch_range(tag, range).map_err(|source| ExportError::TagFetch {
                tag: tag.clone(),
                source,
            })?;
            records.push_points(tag, points);
        }
        info!(tags = tags.len(), rows = records.len(), "exported batch");
        Ok(records)
    }

    /// Like [`Exporter::export_many`], but a failing tag is recorded in the
    /// report and the remaining tags are still fetched
    pub fn export_many_resilient(&self, tags: &TagList, range: &DateRange) -> BatchReport {
        let mut report = BatchReport::default();
        for tag in tags {
            match self.fetch_range(tag, range) {
                Ok(points) => {
                    report.counts.push((tag.clone(), points.len()));
                    report.records.push_points(tag, points);
                }
                Err(error) => {
                    warn!(tag = %tag, error = %error, "tag fetch failed, continuing");
                    report.failures.push(TagFailure {
                        tag: tag.clone(),
                        error,
                    });
                }
            }
        }
        info!(
            tags = tags.len(),
            rows = report.records.len(),
            failed = report.failures.len(),
            "exported batch"
        );
        report
    }

    /// Deep search for tags matching `filter`; `None` lists every tag
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Service` if the search fails.
    pub fn list_tags(&self, filter: Option<&str>) -> Result<TagList> {
        let term = filter.map(str::trim).unwrap_or_default();
        let tags = self.service.search_tags(term, true)?;
        debug!(term, count = tags.len(), "listed tags");
        Ok(TagList::new(tags))
    }
}
