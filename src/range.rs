//! Date-range selection for historical queries
//!
//! Two mutually exclusive modes are supported:
//!
//! - **Trailing window**: `[now - N days, now]`, seven days unless configured
//! - **Explicit range**: two `YYYY-MM-DD` calendar dates, each taken at the
//!   start of the day (UTC)
//!
//! An explicit range whose start falls after its end is rejected here so that
//! it never reaches the query service.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// Default length of the trailing window in days
pub const DEFAULT_TRAILING_DAYS: i64 = 7;

/// Calendar date format accepted for explicit ranges
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors from parsing or validating a date range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Date string is not a valid `YYYY-MM-DD` date
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Start date falls after end date
    #[error("Start date {start} is after end date {end}")]
    StartAfterEnd { start: String, end: String },

    /// Trailing window reaches outside the representable calendar
    #[error("A trailing window of {0} days is too long")]
    WindowTooLong(i64),
}

/// How the caller chose to pick a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Window ending now
    Trailing,
    /// Caller-supplied start and end dates
    Explicit,
}

impl RangeMode {
    /// Map a selection index (trailing first) to a mode
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Trailing),
            1 => Some(Self::Explicit),
            _ => None,
        }
    }
}

/// A closed time interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    ///
    /// # Errors
    ///
    /// Returns `RangeError::StartAfterEnd` if the bounds are inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Window of `days` days ending at `now`; negative lengths count as zero
    ///
    /// # Errors
    ///
    /// Returns `RangeError::WindowTooLong` if the start would fall outside
    /// the supported date range.
    pub fn trailing(now: DateTime<Utc>, days: i64) -> Result<Self, RangeError> {
        let start = Duration::try_days(days.max(0))
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or(RangeError::WindowTooLong(days))?;
        Ok(Self { start, end: now })
    }

    /// Parse two calendar dates into a start-of-day range
    ///
    /// # Errors
    ///
    /// Returns `RangeError::InvalidDate` for malformed input and
    /// `RangeError::StartAfterEnd` if the start date is after the end date.
    pub fn explicit(start: &str, end: &str) -> Result<Self, RangeError> {
        let start = parse_day(start)?;
        let end = parse_day(end)?;
        Self::new(start, end)
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `<start>_<end>` as calendar dates, used in export file names
    #[must_use]
    pub fn file_label(&self) -> String {
        format!(
            "{}_{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Parse a `YYYY-MM-DD` date as midnight UTC
///
/// # Errors
///
/// Returns `RangeError::InvalidDate` if the string is not a valid date.
pub fn parse_day(input: &str) -> Result<DateTime<Utc>, RangeError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| RangeError::InvalidDate(trimmed.to_string()))
}
