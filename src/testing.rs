//! Testing utilities for canary-browser
//!
//! This module provides an in-memory `MockService` standing in for the
//! historian, and a `ScriptedInput` that answers prompts from a fixed script.
//!
//! Only available when compiled with `cfg(test)`.

use crate::range::DateRange;
use crate::service::{QueryService, Result, ServiceError};
use crate::types::{DataPoint, SampleValue, TagPath};
use crate::ui::input::{self, InputError, UserInput};
use chrono::{Duration, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// A service call observed by `MockService`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Browse of a path (empty string for the root)
    Browse(String),
    /// Fetch of a tag, and whether a range was given
    Fetch(String, bool),
    /// Search for a term, and whether it was deep
    Search(String, bool),
}

/// In-memory tag tree
///
/// Paths without registered children browse as empty, i.e. as tags.
#[derive(Debug, Default)]
pub struct MockService {
    children: HashMap<String, Vec<String>>,
    data: BTreeMap<String, Vec<DataPoint>>,
    failing_browse: RefCell<HashSet<String>>,
    failing_fetch: RefCell<HashSet<String>>,
    calls: RefCell<Vec<Call>>,
}

impl MockService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the children of `path` (`""` is the root)
    #[must_use]
    pub fn with_children(mut self, path: &str, children: &[&str]) -> Self {
        self.children.insert(
            path.to_string(),
            children.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Register the samples of a tag
    #[must_use]
    pub fn with_data(mut self, tag: &str, points: Vec<DataPoint>) -> Self {
        self.data.insert(tag.to_string(), points);
        self
    }

    /// Make browsing `path` fail
    #[must_use]
    pub fn failing(self, path: &str) -> Self {
        self.fail_on(path);
        self
    }

    /// Make fetching `tag` fail
    #[must_use]
    pub fn failing_fetch(self, tag: &str) -> Self {
        self.failing_fetch.borrow_mut().insert(tag.to_string());
        self
    }

    /// Make browsing `path` fail from now on
    pub fn fail_on(&self, path: &str) {
        self.failing_browse.borrow_mut().insert(path.to_string());
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl QueryService for MockService {
    fn browse_children(&self, path: &TagPath) -> Result<Vec<String>> {
        let key = path.to_string();
        self.record(Call::Browse(key.clone()));
        if self.failing_browse.borrow().contains(&key) {
            return Err(ServiceError::api("browseNodes", format!("cannot browse '{key}'")));
        }
        Ok(self.children.get(&key).cloned().unwrap_or_default())
    }

    fn fetch_tag_data(&self, tag: &str, range: Option<&DateRange>) -> Result<Vec<DataPoint>> {
        self.record(Call::Fetch(tag.to_string(), range.is_some()));
        if self.failing_fetch.borrow().contains(tag) {
            return Err(ServiceError::api("getTagData", format!("cannot read '{tag}'")));
        }
        Ok(self.data.get(tag).cloned().unwrap_or_default())
    }

    fn search_tags(&self, term: &str, deep: bool) -> Result<Vec<String>> {
        self.record(Call::Search(term.to_string(), deep));
        let needle = term.to_lowercase();
        Ok(self
            .data
            .keys()
            .filter(|tag| tag.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

/// Build one-minute-spaced samples starting 2024-03-01T00:00:00Z
#[must_use]
pub fn points(values: &[f64]) -> Vec<DataPoint> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let minutes = i64::try_from(i).unwrap();
            DataPoint::new(
                (start + Duration::minutes(minutes)).fixed_offset(),
                SampleValue::Number(*v),
            )
        })
        .collect()
}

/// One scripted answer for `ScriptedInput`
#[derive(Debug, Clone)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Select(usize),
    Cancel,
}

/// Prompt handler answering from a queue
///
/// Running out of answers yields `InputError::Cancelled`, which ends any
/// session loop under test.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: Mutex<VecDeque<Answer>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInput {
    /// Script made only of text answers
    #[must_use]
    pub fn lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| Answer::Text((*l).to_string())).collect())
    }

    #[must_use]
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Answers not consumed yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, prompt: &str) -> input::Result<Answer> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(InputError::Cancelled)
    }
}

impl UserInput for ScriptedInput {
    fn prompt_text(
        &self,
        prompt: &str,
        _default: Option<&str>,
        _allow_empty: bool,
    ) -> input::Result<Option<String>> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(Some(text)),
            Answer::Cancel => Ok(None),
            other => Err(InputError::Invalid(format!("expected text, got {other:?}"))),
        }
    }

    fn prompt_password(&self, prompt: &str) -> input::Result<Option<String>> {
        self.prompt_text(prompt, None, true)
    }

    fn prompt_confirm(&self, prompt: &str, _default: bool) -> input::Result<Option<bool>> {
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(Some(yes)),
            Answer::Cancel => Ok(None),
            other => Err(InputError::Invalid(format!("expected confirm, got {other:?}"))),
        }
    }

    fn prompt_select(
        &self,
        prompt: &str,
        _items: &[String],
        _default: Option<usize>,
    ) -> input::Result<Option<usize>> {
        match self.next(prompt)? {
            Answer::Select(index) => Ok(Some(index)),
            Answer::Cancel => Ok(None),
            other => Err(InputError::Invalid(format!("expected select, got {other:?}"))),
        }
    }
}
