//! Main menu actions

use crate::ui::InputError;

/// One entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Explore,
    FetchTag,
    SearchTags,
    DownloadRange,
    ExportTagList,
    BatchDownload,
    Exit,
}

impl MenuAction {
    /// Menu entries in display order
    pub const ALL: [Self; 7] = [
        Self::Explore,
        Self::FetchTag,
        Self::SearchTags,
        Self::DownloadRange,
        Self::ExportTagList,
        Self::BatchDownload,
        Self::Exit,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Explore => "Explore the tag structure",
            Self::FetchTag => "Get tag data",
            Self::SearchTags => "Search tags",
            Self::DownloadRange => "Download a date range for one tag",
            Self::ExportTagList => "Export the full tag list",
            Self::BatchDownload => "Download a date range for a tag list file",
            Self::Exit => "Exit",
        }
    }

    /// Number the user types to pick this entry
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0) + 1
    }

    /// Decode a main menu choice
    ///
    /// # Errors
    ///
    /// Returns `InputError::Invalid` for anything but a listed number.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let trimmed = input.trim();
        trimmed
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| InputError::Invalid(format!("'{trimmed}' is not a menu option")))
    }

    /// `N. label` lines for every entry
    #[must_use]
    pub fn menu_lines() -> Vec<String> {
        Self::ALL
            .iter()
            .map(|a| format!("{}. {}", a.number(), a.label()))
            .collect()
    }
}
