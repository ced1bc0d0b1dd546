//! Browse commands decoded from raw menu input
//!
//! The terminal menu uses reserved numbers for navigation control. They are
//! turned into a [`NavCommand`] here, once, so the navigator never handles
//! raw codes.

use crate::ui::InputError;

/// Menu code that leaves the browse loop
pub const EXIT_CODE: usize = 999;
/// Menu code that goes back one level
pub const BACK_CODE: usize = 998;
/// Menu code that restarts at the root
pub const RESTART_CODE: usize = 997;

/// A navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// Enter the child node at this index of the current listing
    Descend(usize),
    /// Return to the previously visited path
    Back,
    /// Return to the root and forget the history
    Restart,
    /// Leave the browse loop
    Exit,
}

impl NavCommand {
    /// Decode one line of menu input
    ///
    /// # Errors
    ///
    /// Returns `InputError::Invalid` if the input is not a non-negative
    /// integer.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let trimmed = input.trim();
        let code: usize = trimmed
            .parse()
            .map_err(|_| InputError::Invalid(format!("'{trimmed}' is not a number")))?;

        Ok(match code {
            EXIT_CODE => Self::Exit,
            BACK_CODE => Self::Back,
            RESTART_CODE => Self::Restart,
            index => Self::Descend(index),
        })
    }
}
