//! Stateful hierarchy navigation
//!
//! A [`Navigator`] holds the current path, the undo history and the node
//! listing for the current path. Every mutating operation queries the
//! service first and only commits the new state once the query succeeded, so
//! a failed call leaves the navigator exactly as it was.
//!
//! # State machine
//!
//! ```text
//!            descend (children)
//!           ┌──────────┐
//!           ▼          │
//!       AtBranch ──────┘
//!        │    ▲
//! descend│    │ ascend / reset
//! (none) ▼    │
//!        AtLeaf
//! ```

use super::command::NavCommand;
use crate::service::{QueryService, Result};
use crate::types::{TagPath, TagRecord};
use tracing::debug;

/// Whether the current path has children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    AtBranch,
    AtLeaf,
}

/// Result of applying a [`NavCommand`]
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    /// Moved to a path with children; the listing was refreshed
    Branch,
    /// Descended onto a tag and fetched its data
    Leaf {
        path: TagPath,
        records: Vec<TagRecord>,
    },
    /// Back was requested with an empty history
    NothingToUndo,
    /// The requested index is not in the current listing
    InvalidSelection(usize),
    /// The caller asked to leave the browse loop
    Exit,
}

/// Navigation session over a query service
pub struct Navigator<'a, S: QueryService + ?Sized> {
    service: &'a S,
    current: TagPath,
    history: Vec<TagPath>,
    nodes: Vec<String>,
    state: NavState,
}

/// Saved copy of the mutable state, restored when a leaf fetch fails
struct Checkpoint {
    current: TagPath,
    history_len: usize,
    nodes: Vec<String>,
    state: NavState,
}

impl<'a, S: QueryService + ?Sized> Navigator<'a, S> {
    /// Start at the root
    ///
    /// Nothing is fetched until [`Navigator::refresh`] or a navigation call.
    pub fn new(service: &'a S) -> Self {
        Self::with_path(service, TagPath::root())
    }

    /// Start at `path` with an empty history
    pub fn with_path(service: &'a S, path: TagPath) -> Self {
        Self {
            service,
            current: path,
            history: Vec::new(),
            nodes: Vec::new(),
            state: NavState::AtBranch,
        }
    }

    #[must_use]
    pub const fn current_path(&self) -> &TagPath {
        &self.current
    }

    /// Previously visited paths, oldest first
    #[must_use]
    pub fn history(&self) -> &[TagPath] {
        &self.history
    }

    /// Child nodes of the current path as of the last browse
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    #[must_use]
    pub const fn state(&self) -> NavState {
        self.state
    }

    /// Child node names of `path`; empty when `path` is a tag
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the browse call fails.
    pub fn browse(&self, path: &TagPath) -> Result<Vec<String>> {
        debug!(path = %path, "browse");
        self.service.browse_children(path)
    }

    /// Re-browse the current path, keeping path and history
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the browse call fails.
    pub fn refresh(&mut self) -> Result<&[String]> {
        let nodes = self.browse(&self.current)?;
        self.set_nodes(nodes);
        Ok(&self.nodes)
    }

    /// Move one level down into `node_name`
    ///
    /// The previous path is pushed onto the history. When the new path has no
    /// children the navigator enters [`NavState::AtLeaf`].
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the browse call fails; state is unchanged.
    pub fn descend(&mut self, node_name: &str) -> Result<TagPath> {
        let next = self.current.child(node_name);
        let nodes = self.browse(&next)?;

        let previous = std::mem::replace(&mut self.current, next);
        self.history.push(previous);
        self.set_nodes(nodes);
        Ok(self.current.clone())
    }

    /// Return to the most recently visited path
    ///
    /// Returns `Ok(None)` without touching any state when the history is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the browse call fails; state is unchanged.
    pub fn ascend(&mut self) -> Result<Option<TagPath>> {
        let Some(target) = self.history.last() else {
            return Ok(None);
        };
        let nodes = self.browse(target)?;

        if let Some(previous) = self.history.pop() {
            self.current = previous;
        }
        self.nodes = nodes;
        self.state = NavState::AtBranch;
        Ok(Some(self.current.clone()))
    }

    /// Go back to the root and clear the history
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the browse call fails; state is unchanged.
    pub fn reset(&mut self) -> Result<()> {
        let root = TagPath::root();
        let nodes = self.browse(&root)?;

        self.current = root;
        self.history.clear();
        self.nodes = nodes;
        self.state = NavState::AtBranch;
        Ok(())
    }

    /// Fetch the data of the tag at `path`
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the fetch fails.
    pub fn resolve_leaf(&self, path: &TagPath) -> Result<Vec<TagRecord>> {
        let tag = path.to_string();
        debug!(tag = %tag, "resolve leaf");
        let points = self.service.fetch_tag_data(&tag, None)?;
        Ok(points
            .into_iter()
            .map(|point| TagRecord::from_point(&tag, point))
            .collect())
    }

    /// Apply one decoded browse command
    ///
    /// A descent that lands on a tag fetches the tag's data for exactly the
    /// path that returned no children. If that fetch fails the descent is
    /// undone.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if a service call fails; state is unchanged.
    pub fn apply(&mut self, command: NavCommand) -> Result<NavOutcome> {
        match command {
            NavCommand::Exit => Ok(NavOutcome::Exit),
            NavCommand::Back => Ok(match self.ascend()? {
                Some(_) => NavOutcome::Branch,
                None => NavOutcome::NothingToUndo,
            }),
            NavCommand::Restart => {
                self.reset()?;
                Ok(NavOutcome::Branch)
            }
            NavCommand::Descend(index) => {
                let Some(node) = self.nodes.get(index).cloned() else {
                    return Ok(NavOutcome::InvalidSelection(index));
                };

                let checkpoint = self.checkpoint();
                let path = self.descend(&node)?;
                if self.state == NavState::AtBranch {
                    return Ok(NavOutcome::Branch);
                }

                match self.resolve_leaf(&path) {
                    Ok(records) => Ok(NavOutcome::Leaf { path, records }),
                    Err(e) => {
                        self.restore(checkpoint);
                        Err(e)
                    }
                }
            }
        }
    }

    fn set_nodes(&mut self, nodes: Vec<String>) {
        self.state = if nodes.is_empty() {
            NavState::AtLeaf
        } else {
            NavState::AtBranch
        };
        self.nodes = nodes;
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current.clone(),
            history_len: self.history.len(),
            nodes: self.nodes.clone(),
            state: self.state,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.current = checkpoint.current;
        self.history.truncate(checkpoint.history_len);
        self.nodes = checkpoint.nodes;
        self.state = checkpoint.state;
    }
}
