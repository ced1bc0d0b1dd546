//! Prompt abstraction
//!
//! Every question the session asks goes through [`UserInput`]. Each method
//! returns `Ok(None)` when the user backs out of that prompt, and
//! [`InputError::Cancelled`] when input has ended altogether (Ctrl-D, a closed
//! pipe), which the session treats as a request to quit.

use std::io;

/// Source of answers to the session's prompts
///
/// # Examples
///
/// ```no_run
/// use canary_browser::ui::input::{DialoguerInput, UserInput};
///
/// let input = DialoguerInput::new();
/// if let Some(tag) = input.prompt_text("Enter the tag", None, false).unwrap() {
///     println!("Fetching {tag}");
/// }
/// ```
pub trait UserInput: Send + Sync {
    /// One line of text, or `default` when the user just presses enter
    fn prompt_text(
        &self,
        prompt: &str,
        default: Option<&str>,
        allow_empty: bool,
    ) -> Result<Option<String>>;

    /// A secret, read without echo
    fn prompt_password(&self, prompt: &str) -> Result<Option<String>>;

    fn prompt_confirm(&self, prompt: &str, default: bool) -> Result<Option<bool>>;

    /// Index into `items`
    fn prompt_select(
        &self,
        prompt: &str,
        items: &[String],
        default: Option<usize>,
    ) -> Result<Option<usize>>;
}

/// Result type for prompts
pub type Result<T> = std::result::Result<T, InputError>;

/// Prompt failures
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The terminal could not be read
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Input ended before an answer was given
    #[error("Input cancelled by user")]
    Cancelled,

    /// The answer could not be understood
    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl From<dialoguer::Error> for InputError {
    fn from(err: dialoguer::Error) -> Self {
        let dialoguer::Error::IO(err) = err;
        match err.kind() {
            io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted => Self::Cancelled,
            _ => Self::Io(err),
        }
    }
}

/// Terminal prompts rendered with dialoguer
pub struct DialoguerInput {
    theme: dialoguer::theme::ColorfulTheme,
}

impl DialoguerInput {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: dialoguer::theme::ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInput for DialoguerInput {
    fn prompt_text(
        &self,
        prompt: &str,
        default: Option<&str>,
        allow_empty: bool,
    ) -> Result<Option<String>> {
        let mut input = dialoguer::Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(allow_empty);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }

        Ok(Some(input.interact_text()?))
    }

    fn prompt_password(&self, prompt: &str) -> Result<Option<String>> {
        let password = dialoguer::Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(Some(password))
    }

    fn prompt_confirm(&self, prompt: &str, default: bool) -> Result<Option<bool>> {
        Ok(dialoguer::Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()?)
    }

    fn prompt_select(
        &self,
        prompt: &str,
        items: &[String],
        default: Option<usize>,
    ) -> Result<Option<usize>> {
        let select = dialoguer::Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default.unwrap_or(0));

        Ok(select.interact_opt()?)
    }
}
