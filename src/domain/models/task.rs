//! Task envelope.
//!
//! A task is a queue-delivered unit of work described entirely by a flat
//! metadata map. The broker owns a task while it is leased; the dispatcher
//! destroys it after every matched handler completed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::HandlerError;
use crate::domain::models::metadata;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Task {
    pub fn new(meta: BTreeMap<String, String>) -> Self {
        Self { meta }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.meta.get(label).map(String::as_str)
    }

    pub fn set(&mut self, label: &str, value: impl Into<String>) {
        self.meta.insert(label.to_string(), value.into());
    }

    /// Reports whether this task carries every given metadata pair.
    pub fn matches(&self, want: &[(&str, &str)]) -> bool {
        metadata::contains(&self.meta, want)
    }

    /// The metadata value under `label`, or an invalid-task error.
    pub fn require(&self, label: &str) -> Result<&str, HandlerError> {
        self.get(label)
            .ok_or_else(|| HandlerError::InvalidTask(format!("metadata {label} must not be empty")))
    }

    /// The metadata value under `label` parsed as a sorted-set score.
    pub fn require_score(&self, label: &str) -> Result<f64, HandlerError> {
        self.require(label)?
            .parse()
            .map_err(|_| HandlerError::InvalidTask(format!("metadata {label} must be numeric")))
    }

    /// A subordinate task carrying a deep copy of this task's metadata
    /// with the action/resource pair overridden. Sibling tasks must not
    /// alias one metadata map.
    pub fn child(&self, action: &str, resource: &str) -> Task {
        let mut child = self.clone();
        child.set(metadata::TASK_ACTION, action);
        child.set(metadata::TASK_RESOURCE, resource);
        child.meta.remove(metadata::TASK_ID);
        child
    }
}
