//! canary-browser - Interactive browser and exporter for Canary historian tags
//!
//! This library provides hierarchy navigation with an undo history, batch
//! export of tag samples to CSV, and the menu session tying both to a
//! terminal. The historian is reached through the [`service::QueryService`]
//! trait, implemented over the Canary Views HTTP API by
//! [`service::CanaryClient`].

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod export;
pub mod navigate;
pub mod output;
pub mod range;
pub mod service;
pub mod session;
pub mod types;
pub mod ui;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Historian query error
    #[error("Service error: {0}")]
    Service(#[from] service::ServiceError),
    /// Export or tag list file error
    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),
    /// Date range error
    #[error("Date range error: {0}")]
    Range(#[from] range::RangeError),
    /// Prompt error
    #[error("Input error: {0}")]
    Input(#[from] ui::InputError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the session and the binary
pub type Result<T> = std::result::Result<T, BrowserError>;
