//! Label store data model.

use serde::{Deserialize, Serialize};

use crate::source::Frame;

/// A named, enable-able bucket of training examples.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub name: String,
    pub enabled: bool,
    pub examples: Vec<Frame>,
}

impl ClassEntry {
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            examples: Vec::new(),
        }
    }
}

/// Per-class inference output, paired one-to-one with a [`ClassEntry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassResult {
    /// Display label, independent of the class name. `None` until labeled.
    pub name: Option<String>,
    /// Confidence score.
    pub rate: f32,
}

/// Trainer-owned snapshot of one class's trained parameters.
///
/// Only `classId` is interpreted; everything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    #[serde(rename = "classId")]
    pub class_id: usize,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl DatasetEntry {
    pub fn new(class_id: usize) -> Self {
        Self {
            class_id,
            payload: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }
}

/// Errors returned by label store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("class index {index} out of range ({len} slots)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("class {0} is not enabled")]
    ClassDisabled(usize),

    #[error("class {index} already holds the maximum of {limit} examples")]
    ExampleLimit { index: usize, limit: usize },

    #[error("no class has examples to train on")]
    NothingToTrain,

    #[error("training failed: {0}")]
    Training(String),

    #[error("failed to save label store: {0}")]
    Save(String),
}
