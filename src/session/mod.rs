//! Interactive session controller
//!
//! The session owns one [`Navigator`] and one [`Exporter`] over the same
//! query service and dispatches main menu choices to them. All prompting and
//! printing goes through [`UserInput`] and [`OutputWriter`].
//!
//! # Error policy
//!
//! - Invalid menu input, indices and dates are reported and re-prompted
//! - Back with an empty history is reported as a warning
//! - Service and file failures abort the current action, are reported, and
//!   the session returns to the main menu with navigation state untouched
//! - Cancelled input ends the session; terminal I/O failures are returned

mod menu;

pub use menu::MenuAction;

use crate::config::BrowserConfig;
use crate::export::{self, BatchReport, Exporter, RecordSet, TAG_LIST_FILE_NAME, TagList};
use crate::navigate::{NavCommand, NavOutcome, Navigator};
use crate::output;
use crate::range::{DateRange, RangeMode};
use crate::service::QueryService;
use crate::types::{TagPath, TagRecord};
use crate::ui::{InputError, OutputWriter, UserInput};
use crate::{BrowserError, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Interactive menu loop over a query service
pub struct Session<'a, S: QueryService + ?Sized> {
    navigator: Navigator<'a, S>,
    exporter: Exporter<'a, S>,
    config: &'a BrowserConfig,
    input: &'a dyn UserInput,
    output: &'a dyn OutputWriter,
}

impl<'a, S: QueryService + ?Sized> Session<'a, S> {
    /// Create a session whose navigator starts at `start`
    pub fn new(
        service: &'a S,
        start: TagPath,
        config: &'a BrowserConfig,
        input: &'a dyn UserInput,
        output: &'a dyn OutputWriter,
    ) -> Self {
        Self {
            navigator: Navigator::with_path(service, start),
            exporter: Exporter::new(service),
            config,
            input,
            output,
        }
    }

    #[must_use]
    pub const fn navigator(&self) -> &Navigator<'a, S> {
        &self.navigator
    }

    /// Run the main menu until the user exits
    ///
    /// # Errors
    ///
    /// Returns `BrowserError::Input` if reading input fails for a reason
    /// other than cancellation.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.output.write("");
            self.output.write("Options:");
            for line in MenuAction::menu_lines() {
                self.output.write(&line);
            }

            let choice = match self.prompt_line("Select an option", None, false) {
                Ok(Some(choice)) => choice,
                Ok(None) | Err(BrowserError::Input(InputError::Cancelled)) => return Ok(()),
                Err(e) => return Err(e),
            };

            let action = match MenuAction::parse(&choice) {
                Ok(action) => action,
                Err(e) => {
                    self.output.error(&format!("{e}. Please try again."));
                    continue;
                }
            };
            debug!(?action, "menu action");

            if action == MenuAction::Exit {
                return Ok(());
            }

            match self.dispatch(action) {
                Ok(()) => {}
                Err(BrowserError::Input(InputError::Cancelled)) => return Ok(()),
                Err(BrowserError::Input(InputError::Io(e))) => {
                    return Err(BrowserError::Input(InputError::Io(e)));
                }
                Err(e) => self.output.error(&e.to_string()),
            }
        }
    }

    /// Run a single menu action
    ///
    /// # Errors
    ///
    /// Returns the first service, file or input error the action hits.
    pub fn dispatch(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::Explore => self.explore(),
            MenuAction::FetchTag => self.fetch_tag(),
            MenuAction::SearchTags => self.search_tags(),
            MenuAction::DownloadRange => self.download_range(),
            MenuAction::ExportTagList => self.export_tag_list(),
            MenuAction::BatchDownload => self.batch_download(),
            MenuAction::Exit => Ok(()),
        }
    }

    /// Browse sub-loop; returns after Exit or once a tag was reached
    fn explore(&mut self) -> Result<()> {
        self.navigator.refresh()?;

        loop {
            self.show_nodes();

            let Some(line) = self.prompt_line("Select an option", None, false)? else {
                return Ok(());
            };
            let command = match NavCommand::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    self.output.error(&format!("{e}. Please enter a number."));
                    continue;
                }
            };

            match self.navigator.apply(command) {
                Ok(NavOutcome::Exit) => return Ok(()),
                Ok(NavOutcome::Branch) => {}
                Ok(NavOutcome::NothingToUndo) => {
                    self.output.warning("No previous node to go back to.");
                }
                Ok(NavOutcome::InvalidSelection(index)) => {
                    self.output
                        .error(&format!("Invalid choice {index}. Please try again."));
                }
                Ok(NavOutcome::Leaf { path, records }) => {
                    self.show_records(&path.to_string(), &records);
                    if records.is_empty() {
                        self.output.info(&format!(
                            "'{path}' has no child nodes and no samples; it may be an empty branch."
                        ));
                    }
                    return Ok(());
                }
                Err(e) => self.output.error(&e.to_string()),
            }
        }
    }

    fn fetch_tag(&mut self) -> Result<()> {
        let Some(tag) = self.prompt_tag()? else {
            return Ok(());
        };
        let records = self.navigator.resolve_leaf(&tag)?;
        self.show_records(&tag.to_string(), &records);
        Ok(())
    }

    fn search_tags(&mut self) -> Result<()> {
        let Some(term) = self.prompt_line("Search term (empty for all tags)", None, true)? else {
            return Ok(());
        };
        let tags = self.exporter.list_tags(Some(&term))?;

        self.output.write(&format!(
            "Tags found for search '{}': {}",
            term.trim(),
            tags.len()
        ));
        for tag in &tags {
            self.output.write(&output::tag_line(tag));
        }
        Ok(())
    }

    fn download_range(&mut self) -> Result<()> {
        let Some(tag) = self.prompt_tag()? else {
            return Ok(());
        };
        let Some(range) = self.choose_range()? else {
            return Ok(());
        };

        let records = self.exporter.export_single(&tag.to_string(), &range)?;
        let path = self
            .config
            .output_path(&export::single_export_name(&tag, &range));
        self.write_records(&records, &path)
    }

    fn export_tag_list(&mut self) -> Result<()> {
        let Some(filter) = self.prompt_line("Filter (empty for all tags)", None, true)? else {
            return Ok(());
        };
        let filter = Some(filter.trim()).filter(|f| !f.is_empty());
        let tags = self.exporter.list_tags(filter)?;

        let path = self.config.output_path(Path::new(TAG_LIST_FILE_NAME));
        if !self.prepare_target(&path)? {
            return Ok(());
        }
        export::save_tag_list(&tags, &path)?;
        info!(path = %path.display(), tags = tags.len(), "saved tag list");
        self.output
            .success(&format!("Saved {} tags to {}", tags.len(), path.display()));
        Ok(())
    }

    fn batch_download(&mut self) -> Result<()> {
        let default = self
            .config
            .output_path(Path::new(TAG_LIST_FILE_NAME))
            .display()
            .to_string();
        let Some(file) = self.prompt_line("Tag list file", Some(&default), false)? else {
            return Ok(());
        };
        let list_path = PathBuf::from(file.trim());
        let tags = export::read_tag_list(&list_path)?;
        if tags.is_empty() {
            self.output
                .warning(&format!("{} contains no tags", list_path.display()));
        }

        let Some(range) = self.choose_range()? else {
            return Ok(());
        };
        self.output.info(&format!("Fetching {} tags...", tags.len()));

        let records = if self.config.continue_on_error {
            let report = self.exporter.export_many_resilient(&tags, &range);
            self.report_batch(&report, &tags);
            report.records
        } else {
            self.exporter.export_many(&tags, &range)?
        };

        let path = self
            .config
            .output_path(&export::batch_export_name(&list_path, &range));
        self.write_records(&records, &path)
    }

    fn report_batch(&self, report: &BatchReport, tags: &TagList) {
        let fetched = tags.len() - report.failures.len();
        self.output.info(&format!(
            "Fetched {fetched} of {} tags ({} rows)",
            tags.len(),
            report.records.len()
        ));
        if !report.is_complete() {
            self.output.warning(&format!(
                "Failed tags: {}",
                report.failed_tags().join(", ")
            ));
            for failure in &report.failures {
                self.output
                    .error(&format!("{}: {}", failure.tag, failure.error));
            }
        }
    }

    /// Ask for a trailing window or an explicit range
    ///
    /// Malformed or inverted explicit dates are reported and asked again.
    fn choose_range(&self) -> Result<Option<DateRange>> {
        let items = vec![
            format!("Last {} days", self.config.trailing_days),
            "Custom date range".to_string(),
        ];
        let Some(index) = self.input.prompt_select("Date range", &items, Some(0))? else {
            return Ok(None);
        };

        match RangeMode::from_index(index) {
            Some(RangeMode::Trailing) => Ok(Some(DateRange::trailing(
                Utc::now(),
                self.config.trailing_days,
            )?)),
            Some(RangeMode::Explicit) => loop {
                let Some(start) = self.prompt_line("Start date (YYYY-MM-DD)", None, false)? else {
                    return Ok(None);
                };
                let Some(end) = self.prompt_line("End date (YYYY-MM-DD)", None, false)? else {
                    return Ok(None);
                };
                match DateRange::explicit(&start, &end) {
                    Ok(range) => return Ok(Some(range)),
                    Err(e) => self.output.error(&format!("{e}. Please try again.")),
                }
            },
            None => Err(BrowserError::InvalidInput(format!(
                "unknown date range option {index}"
            ))),
        }
    }

    fn prompt_tag(&self) -> Result<Option<TagPath>> {
        loop {
            let Some(raw) = self.prompt_line("Enter the tag", None, false)? else {
                return Ok(None);
            };
            let tag = TagPath::parse(&raw);
            if !tag.is_root() {
                return Ok(Some(tag));
            }
            self.output.error("Tag name cannot be empty.");
        }
    }

    fn prompt_line(
        &self,
        prompt: &str,
        default: Option<&str>,
        allow_empty: bool,
    ) -> Result<Option<String>> {
        Ok(self.input.prompt_text(prompt, default, allow_empty)?)
    }

    /// Create the parent directory and confirm overwriting an existing file
    fn prepare_target(&self, path: &Path) -> Result<bool> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            return Ok(true);
        }

        let prompt = format!("{} already exists. Overwrite?", path.display());
        if self.input.prompt_confirm(&prompt, false)? == Some(true) {
            Ok(true)
        } else {
            self.output.info("Skipped writing the file.");
            Ok(false)
        }
    }

    fn write_records(&self, records: &RecordSet, path: &Path) -> Result<()> {
        if !self.prepare_target(path)? {
            return Ok(());
        }
        records.save(path)?;
        info!(path = %path.display(), rows = records.len(), "wrote export");
        self.output
            .success(&format!("Wrote {} rows to {}", records.len(), path.display()));
        Ok(())
    }

    fn show_nodes(&self) {
        self.output.write("");
        self.output.write(&output::location(self.navigator.current_path()));
        let nodes = self.navigator.nodes();
        if nodes.is_empty() {
            self.output.info("No child nodes here.");
        }
        for (index, node) in nodes.iter().enumerate() {
            self.output.write(&output::node_line(index, node));
        }
        self.output.write("");
        for line in output::browse_controls() {
            self.output.write(&line);
        }
    }

    fn show_records(&self, tag: &str, records: &[TagRecord]) {
        self.output
            .write(&output::records_heading(tag, records.len()));
        for record in records {
            self.output.write(&output::record_line(record));
        }
    }
}
