//! Query service error types
//!
//! Every failure talking to the historian ends up as a `ServiceError`. None of
//! them are recovered locally: they abort the current operation and are
//! reported to the user by the session.

use thiserror::Error;

/// Errors raised by a query service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport or HTTP status failure
    #[error("Request to {operation} failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    /// Reading or decoding the response body failed
    #[error("Error while reading response: {0}")]
    Io(#[from] std::io::Error),

    /// The historian answered with a non-good status
    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    /// The response was structurally unexpected
    #[error("Invalid response from {operation}: {message}")]
    InvalidResponse { operation: String, message: String },

    /// Server address cannot be turned into an API URL
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),
}

impl ServiceError {
    /// Build an `Api` error for the named operation
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result type for query service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
