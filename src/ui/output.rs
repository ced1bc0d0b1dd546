//! Message sink
//!
//! The session never prints directly. It hands each message to an
//! [`OutputWriter`] together with its severity, which lets the terminal
//! writer pick colors and streams and lets tests read back what was said.

use colored::{ColoredString, Colorize};
use std::sync::Mutex;

/// Severity-tagged message sink
///
/// # Examples
///
/// ```no_run
/// use canary_browser::ui::output::{OutputWriter, StdoutWriter};
///
/// let output = StdoutWriter::new();
/// output.write("[0] Plant");
/// output.success("Wrote 42 rows to Plant_Temp.csv");
/// output.error("getTagData failed: tag not found");
/// ```
pub trait OutputWriter: Send + Sync {
    /// Plain listing or data line
    fn write(&self, message: &str);

    fn error(&self, message: &str);

    fn success(&self, message: &str);

    fn warning(&self, message: &str);

    /// Progress and hints; dropped in quiet mode
    fn info(&self, message: &str);
}

/// Severity of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Normal,
    Error,
    Success,
    Warning,
    Info,
}

impl MessageLevel {
    /// Terminal marker printed before the message
    fn marker(self) -> Option<ColoredString> {
        match self {
            Self::Normal | Self::Info => None,
            Self::Error => Some("❌".red()),
            Self::Success => Some("✓".green()),
            Self::Warning => Some("⚠️".yellow()),
        }
    }
}

/// Terminal writer
///
/// Errors go to stderr, everything else to stdout.
#[derive(Debug, Default)]
pub struct StdoutWriter {
    quiet: bool,
}

impl StdoutWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self { quiet: false }
    }

    /// Writer that drops info messages
    #[must_use]
    pub const fn quiet() -> Self {
        Self { quiet: true }
    }

    fn emit(&self, level: MessageLevel, message: &str) {
        let line = match (level, level.marker()) {
            (MessageLevel::Info, _) if self.quiet => return,
            (MessageLevel::Info, _) => message.dimmed().to_string(),
            (_, Some(marker)) => format!("{marker} {message}"),
            (_, None) => message.to_string(),
        };

        if level == MessageLevel::Error {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl OutputWriter for StdoutWriter {
    fn write(&self, message: &str) {
        self.emit(MessageLevel::Normal, message);
    }

    fn error(&self, message: &str) {
        self.emit(MessageLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.emit(MessageLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.emit(MessageLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.emit(MessageLevel::Info, message);
    }
}

/// Writer that records messages in memory
///
/// # Examples
///
/// ```
/// use canary_browser::ui::output::{BufferWriter, MessageLevel, OutputWriter};
///
/// let writer = BufferWriter::new();
/// writer.success("Saved");
/// assert_eq!(writer.messages(), vec![(MessageLevel::Success, "Saved".to_string())]);
/// ```
#[derive(Debug, Default)]
pub struct BufferWriter {
    messages: Mutex<Vec<(MessageLevel, String)>>,
}

impl BufferWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, oldest first
    #[must_use]
    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Whether a message of `level` contains `needle`
    #[must_use]
    pub fn contains(&self, level: MessageLevel, needle: &str) -> bool {
        self.messages()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    #[must_use]
    pub fn of_level(&self, level: MessageLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|(l, m)| (l == level).then_some(m))
            .collect()
    }

    fn record(&self, level: MessageLevel, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

impl OutputWriter for BufferWriter {
    fn write(&self, message: &str) {
        self.record(MessageLevel::Normal, message);
    }

    fn error(&self, message: &str) {
        self.record(MessageLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.record(MessageLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.record(MessageLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.record(MessageLevel::Info, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert!(MessageLevel::Normal.marker().is_none());
        assert!(MessageLevel::Info.marker().is_none());
        assert!(MessageLevel::Error.marker().is_some());
    }

    #[test]
    fn test_buffer_keeps_order_and_level() {
        let writer = BufferWriter::new();
        writer.success("Wrote 3 rows");
        writer.error("cannot read 'T'");
        writer.warning("Failed tags: T");

        let levels: Vec<MessageLevel> = writer.messages().into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            levels,
            [MessageLevel::Success, MessageLevel::Error, MessageLevel::Warning]
        );
        assert_eq!(writer.messages()[0].1, "Wrote 3 rows");
    }

    #[test]
    fn test_buffer_contains_checks_level() {
        let writer = BufferWriter::new();
        writer.info("Fetching 3 tags...");

        assert!(writer.contains(MessageLevel::Info, "3 tags"));
        assert!(!writer.contains(MessageLevel::Error, "3 tags"));
    }

    #[test]
    fn test_buffer_of_level() {
        let writer = BufferWriter::new();
        writer.write("[0] Plant");
        writer.error("bad");
        writer.write("[1] Office");

        assert_eq!(writer.of_level(MessageLevel::Normal), ["[0] Plant", "[1] Office"]);
    }
}
