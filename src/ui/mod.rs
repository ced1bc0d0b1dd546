//! UI abstraction layer
//!
//! Prompts and messages go through two traits so that the session logic does
//! not depend on a terminal:
//!
//! - **`UserInput`** - text, password, confirmation and list prompts
//! - **`OutputWriter`** - status messages with severity levels
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      Session controller                 │
//! └────────────────┬────────────────────────┘
//!                  │ Uses traits
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │      UserInput / OutputWriter           │
//! └────────────────┬────────────────────────┘
//!         ┌────────┴────────┐
//!         ▼                 ▼
//! ┌───────────────┐  ┌───────────────────┐
//! │ Dialoguer     │  │ Scripted input    │
//! │ Stdout        │  │ BufferWriter      │
//! └───────────────┘  └───────────────────┘
//! ```

pub mod input;
pub mod output;

pub use input::{DialoguerInput, InputError, UserInput};
pub use output::{BufferWriter, MessageLevel, OutputWriter, StdoutWriter};
