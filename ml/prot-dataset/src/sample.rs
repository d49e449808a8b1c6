//! Dataset sample type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single dataset sample.
///
/// Every sample has a unique `sample_id`. Everything else a task wants to
/// batch (sequence, label, ...) lives in `fields`, which is flattened when
/// serialized.
///
/// # Example
///
/// ```
/// use prot_dataset::Sample;
///
/// let sample = Sample::new("P04637")
///     .with_field("x", "MEEPQSDPSV")
///     .with_field("y", 2);
///
/// assert_eq!(sample.sample_id, "P04637");
/// assert_eq!(sample.get("y").and_then(|v| v.as_u64()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique sample ID.
    pub sample_id: String,

    /// Task-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Sample {
    /// Creates a sample with no fields.
    #[must_use]
    pub fn new(sample_id: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            fields: Map::new(),
        }
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns a string field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns a copy with only the given keys (the id is always kept).
    #[must_use]
    pub fn project(&self, keys: &[&str]) -> Self {
        Self {
            sample_id: self.sample_id.clone(),
            fields: self
                .fields
                .iter()
                .filter(|(key, _)| keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}
