//! Class-balanced sample weights.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::info;

use crate::error::{DatasetError, Result};
use crate::sample::Sample;

/// Returns the grouping key of a label value.
///
/// Strings are used as-is; any other JSON value by its JSON text, so `1`
/// and `"1"` group together.
#[must_use]
pub fn label_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Counts samples per distinct value of `key`.
///
/// # Errors
///
/// Returns [`DatasetError::MissingField`] if a sample has no `key` field.
pub fn label_counts(samples: &[Sample], key: &str) -> Result<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();
    for sample in samples {
        let value = sample
            .get(key)
            .ok_or_else(|| DatasetError::missing_field(&sample.sample_id, key))?;
        *counts.entry(label_key(value)).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Computes inverse-frequency weights so every class carries equal mass.
///
/// Each of the `k` classes gets a total weight of `1 / k`, spread evenly over
/// its samples. Weights are returned in sample order, ready for a weighted
/// random sampler.
///
/// # Errors
///
/// Returns [`DatasetError::MissingField`] if a sample has no `key` field.
///
/// # Example
///
/// ```
/// use prot_dataset::{class_balanced_weights, Sample};
///
/// let samples: Vec<Sample> = [0, 0, 1]
///     .iter()
///     .enumerate()
///     .map(|(i, y)| Sample::new(i.to_string()).with_field("y", *y))
///     .collect();
///
/// let weights = class_balanced_weights(&samples, "y").unwrap();
/// assert!((weights[0] - 0.25).abs() < 1e-12);
/// assert!((weights[2] - 0.5).abs() < 1e-12);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn class_balanced_weights(samples: &[Sample], key: &str) -> Result<Vec<f64>> {
    let counts = label_counts(samples, key)?;
    if counts.is_empty() {
        return Ok(Vec::new());
    }

    let weight_per_label = 1.0 / counts.len() as f64;
    let label_weights: BTreeMap<&str, f64> = counts
        .iter()
        .map(|(label, count)| (label.as_str(), weight_per_label / *count as f64))
        .collect();

    info!("Class counts are: {:?}", counts);
    info!("Label weights are: {:?}", label_weights);

    samples
        .iter()
        .map(|sample| {
            sample
                .get(key)
                .and_then(|value| label_weights.get(label_key(value).as_str()).copied())
                .ok_or_else(|| DatasetError::missing_field(&sample.sample_id, key))
        })
        .collect()
}
