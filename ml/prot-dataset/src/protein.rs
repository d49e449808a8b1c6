//! Protein sequence classification task.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde_json::Value;
use tracing::debug;

use crate::config::DatasetConfig;
use crate::dataset::DatasetTask;
use crate::error::Result;
use crate::metadata::Metadata;
use crate::sample::Sample;
use crate::splits::{Split, assign_configured_splits, record_split};
use crate::weights::label_key;

/// Metadata field holding the record id.
pub const SAMPLE_ID_KEY: &str = "sample_id";
/// Metadata field holding the amino-acid sequence.
pub const SEQUENCE_KEY: &str = "sequence";
/// Metadata field holding the class index.
pub const LABEL_KEY: &str = "y";

/// Sample field holding the model input (the sequence).
pub const INPUT_KEY: &str = "x";

/// Dataset of protein sequences labelled with a class index.
///
/// Each metadata record is expected to look like:
///
/// ```json
/// {"sample_id": "P04637", "sequence": "MEEPQSDPSV...", "y": 2, "split": "train"}
/// ```
///
/// Records without `sample_id` get `sample_{index}`; a generated ID that
/// repeats an explicit one is rejected by [`Dataset::new`](crate::Dataset::new). With
/// `assign_splits` enabled the `split` field is overwritten before samples
/// are selected.
///
/// # Example
///
/// ```
/// use prot_dataset::{DatasetConfig, DatasetTask, ProteinSequenceTask, Sample};
///
/// let task = ProteinSequenceTask::from_config(&DatasetConfig::default());
/// let sample = Sample::new("P1").with_field("x", "MKV").with_field("y", 1);
///
/// assert!(task.check_label(&sample));
/// assert!(!task.skip_sample(&sample));
/// assert_eq!(task.get_label(&sample), Some(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProteinSequenceTask {
    num_classes: usize,
    max_sequence_length: usize,
}

impl ProteinSequenceTask {
    /// Keys batched for this task.
    pub const ITEM_KEYS: &'static [&'static str] = &[SAMPLE_ID_KEY, INPUT_KEY];

    /// Creates a task.
    #[must_use]
    pub const fn new(num_classes: usize, max_sequence_length: usize) -> Self {
        Self {
            num_classes,
            max_sequence_length,
        }
    }

    /// Creates a task from dataset configuration.
    #[must_use]
    pub const fn from_config(config: &DatasetConfig) -> Self {
        Self::new(config.num_classes, config.max_sequence_length)
    }

    /// Returns the number of classes.
    #[must_use]
    pub const fn num_classes(&self) -> usize {
        self.num_classes
    }
}

impl DatasetTask for ProteinSequenceTask {
    fn create_dataset(
        &self,
        mut metadata: Metadata,
        split: Split,
        config: &DatasetConfig,
    ) -> Result<Vec<Sample>> {
        if config.assign_splits {
            assign_configured_splits(&mut metadata, config)?;
        }

        let mut samples = Vec::new();
        let mut unsplit = 0usize;
        for (index, record) in metadata.into_iter().enumerate() {
            let Some(mut record) = record else { continue };
            match record_split(&record) {
                Some(s) if s == split => {}
                Some(_) => continue,
                None => {
                    unsplit += 1;
                    continue;
                }
            }

            let sample_id = match record.remove(SAMPLE_ID_KEY) {
                Some(Value::String(id)) => id,
                Some(other) => label_key(&other),
                None => format!("sample_{index}"),
            };
            let sequence = record.remove(SEQUENCE_KEY).unwrap_or(Value::Null);
            let label = record.remove(LABEL_KEY).unwrap_or(Value::Null);

            samples.push(
                Sample::new(sample_id)
                    .with_field(INPUT_KEY, sequence)
                    .with_field(LABEL_KEY, label),
            );
        }

        if unsplit > 0 {
            debug!("Ignored {} records with no split label", unsplit);
        }
        Ok(samples)
    }

    fn skip_sample(&self, sample: &Sample) -> bool {
        match sample.get_str(INPUT_KEY) {
            Some(sequence) => sequence.is_empty() || sequence.len() > self.max_sequence_length,
            None => true,
        }
    }

    fn check_label(&self, sample: &Sample) -> bool {
        self.get_label(sample).is_some()
    }

    fn get_label(&self, sample: &Sample) -> Option<usize> {
        sample
            .get(LABEL_KEY)
            .and_then(Value::as_u64)
            .and_then(|y| usize::try_from(y).ok())
            .filter(|y| *y < self.num_classes)
    }

    #[allow(clippy::let_underscore_must_use)]
    fn summary_statement(&self, samples: &[Sample]) -> String {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for sample in samples {
            if let Some(label) = self.get_label(sample) {
                *counts.entry(label).or_insert(0) += 1;
            }
        }

        let mut statement = String::new();
        let _ = writeln!(
            statement,
            "Contains {} protein sequences across {} of {} classes.",
            samples.len(),
            counts.len(),
            self.num_classes
        );
        let _ = write!(statement, "Class counts: {counts:?}");
        statement
    }

    fn item_keys(&self) -> &'static [&'static str] {
        Self::ITEM_KEYS
    }
}
