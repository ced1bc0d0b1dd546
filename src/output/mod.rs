//! Output formatting for CLI display
//!
//! Helpers that turn nodes, records and tag lists into display lines. They
//! return strings; printing is left to the `OutputWriter`.

use crate::navigate::{BACK_CODE, EXIT_CODE, RESTART_CODE};
use crate::types::{TagPath, TagRecord};
use chrono::SecondsFormat;
use colored::Colorize;

/// Format the current location for the browse header
#[must_use]
pub fn location(path: &TagPath) -> String {
    if path.is_root() {
        "Browsing: <root>".to_string()
    } else {
        format!("Browsing: {}", path.to_string().bold())
    }
}

/// Format one selectable node
#[must_use]
pub fn node_line(index: usize, name: &str) -> String {
    format!("[{index}] {name}")
}

/// Reserved browse choices shown below the node list
#[must_use]
pub fn browse_controls() -> [String; 3] {
    [
        format!("[{EXIT_CODE}] Exit"),
        format!("[{BACK_CODE}] Back One Node"),
        format!("[{RESTART_CODE}] Start Over"),
    ]
}

/// Format one sample for display
#[must_use]
pub fn record_line(record: &TagRecord) -> String {
    format!(
        "  {}  {}",
        record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
            .dimmed(),
        record.value
    )
}

/// Header shown above the samples of a tag
#[must_use]
pub fn records_heading(tag: &str, count: usize) -> String {
    let noun = if count == 1 { "sample" } else { "samples" };
    format!("Tag data for {tag}: {count} {noun}")
}

/// Format a tag from a search result
#[must_use]
pub fn tag_line(tag: &str) -> String {
    format!("  {tag}")
}
