//! Query service abstraction
//!
//! The navigator and the export pipeline only see the `QueryService` trait.
//! The production implementation is [`canary::CanaryClient`], which talks to
//! a Canary Views server over its JSON web API; tests substitute an
//! in-memory tree.
//!
//! # Operations
//!
//! - **`browse_children`**: child node names one level below a path
//! - **`fetch_tag_data`**: samples for one tag, optionally within a range
//! - **`search_tags`**: tag paths matching a search term

pub mod canary;
mod error;

pub use canary::{CanaryClient, ClientOptions, Credentials, ViewSession};
pub use error::{Result, ServiceError};

use crate::range::DateRange;
use crate::types::{DataPoint, TagPath};

/// Operations the core needs from the historian
///
/// Implementations are blocking; every call returns only once the remote
/// side has answered.
pub trait QueryService {
    /// List child node names of `path`, in the order the service returns them
    ///
    /// An empty list means `path` has no children, which the navigator treats
    /// as the path being a tag.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the service call fails.
    fn browse_children(&self, path: &TagPath) -> Result<Vec<String>>;

    /// Fetch samples for `tag`
    ///
    /// With `range` set to `None` the service picks its default window.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the service call fails.
    fn fetch_tag_data(&self, tag: &str, range: Option<&DateRange>) -> Result<Vec<DataPoint>>;

    /// Search tags whose path matches `term`
    ///
    /// `deep` searches the whole hierarchy instead of a single level. An empty
    /// term matches every tag.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the service call fails.
    fn search_tags(&self, term: &str, deep: bool) -> Result<Vec<String>>;
}
