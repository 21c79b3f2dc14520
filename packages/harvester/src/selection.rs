//! The user's ordered list of statutes queued for bundling.
//!
//! Entries are display labels. Insertion order decides output order and
//! duplicates are ignored on insert. The list persists as a JSON array of
//! strings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HarvesterError, Result};

/// Ordered, duplicate-free list of display labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionList {
    labels: Vec<String>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `label` unless it is already selected.
    ///
    /// Returns `true` when the label was added.
    pub fn add(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    /// Append every label in order, skipping ones already selected.
    ///
    /// Returns the number of labels added.
    pub fn extend<I, S>(&mut self, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for label in labels {
            if self.add(label) {
                added += 1;
            }
        }
        added
    }

    /// Remove `label`. Returns `true` when it was present.
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        self.labels.len() != before
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Serialize as a pretty-printed JSON array of strings.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.labels)?)
    }

    /// Replace the list with the JSON array in `json`.
    ///
    /// The content is taken verbatim. On malformed input the list is left
    /// unchanged.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let labels: Vec<String> = serde_json::from_str(json)
            .map_err(|e| HarvesterError::SelectionLoad(e.to_string()))?;
        self.labels = labels;
        Ok(())
    }

    /// Replace the list with the contents of a JSON file.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path).map_err(|e| {
            HarvesterError::SelectionLoad(format!("{}: {e}", path.display()))
        })?;
        self.load_json(&json)
    }

    /// Write the list to a JSON file.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}
