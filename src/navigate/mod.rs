//! Tag hierarchy navigation
//!
//! - **`Navigator`**: current path, undo history and leaf fallback
//! - **`NavCommand`**: browse commands decoded from menu input

mod command;
mod navigator;

pub use command::{BACK_CODE, EXIT_CODE, NavCommand, RESTART_CODE};
pub use navigator::{NavOutcome, NavState, Navigator};
