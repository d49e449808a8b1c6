//! Dataset core: task trait and the indexable dataset built from it.
//!
//! A [`DatasetTask`] says how to turn metadata into samples for one kind of
//! prediction problem. [`Dataset`] runs the shared construction sequence
//! against any task:
//!
//! 1. load metadata
//! 2. create the samples of the requested split, rejecting repeated sample
//!    IDs and dropping skippable samples and samples without a valid label
//! 3. stop early if nothing is left
//! 4. compute class-balanced weights when enabled
//! 5. log a summary statement

use std::collections::HashSet;

use burn::data::dataset::Dataset as BurnDataset;
use tracing::{debug, info, warn};

use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::metadata::{Metadata, load_metadata};
use crate::sample::Sample;
use crate::splits::Split;
use crate::weights::class_balanced_weights;

/// Keys batched by default.
pub const DEFAULT_ITEM_KEYS: &[&str] = &["sample_id"];

/// Task-specific behaviour of a dataset.
///
/// Implement this once per prediction task. Only `create_dataset`, the
/// label predicates and the summary are required; metadata loading and item
/// loading have defaults.
pub trait DatasetTask: Send + Sync {
    /// Loads the raw metadata.
    ///
    /// Defaults to reading the JSON file at `config.dataset_file_path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MetadataLoad`] if the file is missing or
    /// unparsable, or [`DatasetError::InvalidConfig`] if no path is set.
    fn load_metadata(&self, config: &DatasetConfig) -> Result<Metadata> {
        let path = config.dataset_file_path.as_deref().ok_or_else(|| {
            DatasetError::invalid_config("dataset_file_path is required to load metadata")
        })?;
        load_metadata(path)
    }

    /// Builds the ordered samples of `split` from the metadata.
    ///
    /// Call [`assign_configured_splits`](crate::assign_configured_splits)
    /// here when `config.assign_splits` is set.
    ///
    /// # Errors
    ///
    /// Any error aborts dataset construction.
    fn create_dataset(
        &self,
        metadata: Metadata,
        split: Split,
        config: &DatasetConfig,
    ) -> Result<Vec<Sample>>;

    /// Returns `true` if the sample should be left out.
    fn skip_sample(&self, sample: &Sample) -> bool;

    /// Returns `true` if the sample carries a valid label for the task.
    fn check_label(&self, sample: &Sample) -> bool;

    /// Returns the class index of the sample.
    fn get_label(&self, sample: &Sample) -> Option<usize>;

    /// Returns task statistics for the summary statement.
    fn summary_statement(&self, samples: &[Sample]) -> String;

    /// Keys kept when a sample is batched.
    fn item_keys(&self) -> &'static [&'static str] {
        DEFAULT_ITEM_KEYS
    }

    /// Loads the full item for a sample.
    ///
    /// # Errors
    ///
    /// Failures are logged and the item skipped during iteration.
    fn load_item(&self, sample: &Sample) -> Result<Sample> {
        Ok(sample.clone())
    }
}

impl<T: DatasetTask + ?Sized> DatasetTask for Box<T> {
    fn load_metadata(&self, config: &DatasetConfig) -> Result<Metadata> {
        (**self).load_metadata(config)
    }

    fn create_dataset(
        &self,
        metadata: Metadata,
        split: Split,
        config: &DatasetConfig,
    ) -> Result<Vec<Sample>> {
        (**self).create_dataset(metadata, split, config)
    }

    fn skip_sample(&self, sample: &Sample) -> bool {
        (**self).skip_sample(sample)
    }

    fn check_label(&self, sample: &Sample) -> bool {
        (**self).check_label(sample)
    }

    fn get_label(&self, sample: &Sample) -> Option<usize> {
        (**self).get_label(sample)
    }

    fn summary_statement(&self, samples: &[Sample]) -> String {
        (**self).summary_statement(samples)
    }

    fn item_keys(&self) -> &'static [&'static str] {
        (**self).item_keys()
    }

    fn load_item(&self, sample: &Sample) -> Result<Sample> {
        (**self).load_item(sample)
    }
}

/// Samples of one split, ready for batching.
///
/// Immutable once built, so it can be shared between data loader workers
/// without locking. Implements burn's [`Dataset`](BurnDataset) so it plugs
/// straight into a `DataLoader`.
#[derive(Debug)]
pub struct Dataset<T> {
    task: T,
    split: Split,
    samples: Vec<Sample>,
    weights: Option<Vec<f64>>,
    summary: Option<String>,
}

impl<T: DatasetTask> Dataset<T> {
    /// Builds the dataset of `split`.
    ///
    /// An empty split is not an error: the dataset is returned with no
    /// weights and no summary.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DuplicateSampleId`] if two created samples
    /// share an ID, or the first error from config validation, metadata
    /// loading, sample creation, or weight computation.
    pub fn new(task: T, config: &DatasetConfig, split: Split) -> Result<Self> {
        config.validate()?;

        let metadata = task.load_metadata(config)?;
        let created = task.create_dataset(metadata, split, config)?;
        check_unique_ids(&created)?;
        let created_count = created.len();

        let samples: Vec<Sample> = created
            .into_iter()
            .filter(|sample| !task.skip_sample(sample) && task.check_label(sample))
            .collect();
        if samples.len() < created_count {
            debug!(
                "Dropped {} of {} {} samples (skipped or invalid label)",
                created_count - samples.len(),
                created_count,
                split
            );
        }

        let mut dataset = Self {
            task,
            split,
            samples,
            weights: None,
            summary: None,
        };

        if dataset.samples.is_empty() {
            return Ok(dataset);
        }

        if config.class_bal {
            dataset.weights = Some(class_balanced_weights(
                &dataset.samples,
                &config.class_bal_key,
            )?);
        }

        let statement = format!(
            "{} DATASET CREATED FOR {}.\n{}",
            split.name().to_uppercase(),
            config.dataset_name.to_uppercase(),
            dataset.task.summary_statement(&dataset.samples)
        );
        info!("{}", statement);
        dataset.summary = Some(statement);

        Ok(dataset)
    }

    /// Returns the sample at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::IndexOutOfRange`] if `index >= len()`.
    pub fn get_item(&self, index: usize) -> Result<&Sample> {
        self.samples
            .get(index)
            .ok_or(DatasetError::index_out_of_range(index, self.samples.len()))
    }

    /// Loads the item at `index` through the task.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::IndexOutOfRange`] or the task's load error.
    pub fn item(&self, index: usize) -> Result<Sample> {
        let sample = self.get_item(index)?;
        self.task.load_item(sample)
    }

    /// Iterates loaded items in order, skipping items that fail to load.
    pub fn iter_items(&self) -> impl Iterator<Item = Sample> + '_ {
        self.samples
            .iter()
            .filter_map(|sample| self.load_or_warn(sample))
    }

    fn load_or_warn(&self, sample: &Sample) -> Option<Sample> {
        match self.task.load_item(sample) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!("Could not load sample {}: {}", sample.sample_id, err);
                None
            }
        }
    }

    /// Returns the class index of the sample at `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<usize> {
        self.samples
            .get(index)
            .and_then(|sample| self.task.get_label(sample))
    }
}

fn check_unique_ids(samples: &[Sample]) -> Result<()> {
    let mut seen = HashSet::with_capacity(samples.len());
    for sample in samples {
        if !seen.insert(sample.sample_id.as_str()) {
            return Err(DatasetError::duplicate_sample_id(&sample.sample_id));
        }
    }
    Ok(())
}

impl<T> Dataset<T> {
    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the split has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns all samples in construction order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Returns the class-balanced weights, one per sample, when enabled.
    #[must_use]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Returns the split this dataset holds.
    #[must_use]
    pub const fn split(&self) -> Split {
        self.split
    }

    /// Returns the task.
    #[must_use]
    pub const fn task(&self) -> &T {
        &self.task
    }

    /// Returns the summary statement logged at construction.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

impl<T: DatasetTask> Dataset<T> {
    /// Returns the keys kept when samples are batched.
    #[must_use]
    pub fn item_keys(&self) -> &'static [&'static str] {
        self.task.item_keys()
    }

    /// Returns the fields of the sample at `index` that travel with a batch,
    /// i.e. the sample restricted to [`item_keys`](Self::item_keys).
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::IndexOutOfRange`] if `index >= len()`.
    pub fn batch_fields(&self, index: usize) -> Result<Sample> {
        Ok(self.get_item(index)?.project(self.item_keys()))
    }
}

impl<T: DatasetTask> BurnDataset<Sample> for Dataset<T> {
    fn get(&self, index: usize) -> Option<Sample> {
        self.samples
            .get(index)
            .and_then(|sample| self.load_or_warn(sample))
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    /// Task that hands out a fixed list of samples for every split.
    struct FixedTask {
        samples: Vec<Sample>,
    }

    impl DatasetTask for FixedTask {
        fn load_metadata(&self, _config: &DatasetConfig) -> Result<Metadata> {
            Ok(Vec::new())
        }

        fn create_dataset(
            &self,
            _metadata: Metadata,
            _split: Split,
            _config: &DatasetConfig,
        ) -> Result<Vec<Sample>> {
            Ok(self.samples.clone())
        }

        fn skip_sample(&self, sample: &Sample) -> bool {
            sample.get("skip").and_then(Value::as_bool).unwrap_or(false)
        }

        fn check_label(&self, sample: &Sample) -> bool {
            sample.get("y").and_then(Value::as_u64).is_some()
        }

        fn get_label(&self, sample: &Sample) -> Option<usize> {
            sample
                .get("y")
                .and_then(Value::as_u64)
                .and_then(|y| usize::try_from(y).ok())
        }

        fn summary_statement(&self, samples: &[Sample]) -> String {
            format!("{} samples", samples.len())
        }

        fn load_item(&self, sample: &Sample) -> Result<Sample> {
            if sample.get("corrupt").is_some() {
                return Err(DatasetError::load_sample(&sample.sample_id, "corrupt"));
            }
            Ok(sample.clone())
        }
    }

    fn labelled(ys: &[u64]) -> Vec<Sample> {
        ys.iter()
            .enumerate()
            .map(|(i, y)| Sample::new(format!("s{i}")).with_field("y", *y))
            .collect()
    }

    #[test]
    fn length_and_indexing() {
        let task = FixedTask {
            samples: labelled(&[0, 1, 2]),
        };
        let dataset = Dataset::new(task, &DatasetConfig::default(), Split::Train).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.get_item(1).map(|s| s.sample_id.as_str()).ok(), Some("s1"));
        assert!(matches!(
            dataset.get_item(3),
            Err(DatasetError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(dataset.label(2), Some(2));
        assert_eq!(dataset.split(), Split::Train);
    }

    #[test]
    fn invalid_and_skipped_samples_are_dropped() {
        let mut samples = labelled(&[0, 1]);
        samples.push(Sample::new("unlabelled"));
        samples.push(Sample::new("skipped").with_field("y", 0).with_field("skip", true));

        let dataset =
            Dataset::new(FixedTask { samples }, &DatasetConfig::default(), Split::Dev).unwrap();

        assert_eq!(dataset.len(), 2);
        assert!(dataset
            .samples()
            .iter()
            .all(|s| s.sample_id != "unlabelled" && s.sample_id != "skipped"));
    }

    #[test]
    fn repeated_sample_ids_are_rejected() {
        let samples = vec![
            Sample::new("P1").with_field("y", 0),
            Sample::new("P2").with_field("y", 1),
            Sample::new("P1").with_field("y", 1),
        ];

        let result = Dataset::new(FixedTask { samples }, &DatasetConfig::default(), Split::Train);
        assert!(matches!(result, Err(DatasetError::DuplicateSampleId { id }) if id == "P1"));
    }

    #[test]
    fn repeated_ids_on_dropped_samples_are_still_rejected() {
        let samples = vec![Sample::new("P1").with_field("y", 0), Sample::new("P1")];

        let result = Dataset::new(FixedTask { samples }, &DatasetConfig::default(), Split::Train);
        assert!(matches!(result, Err(DatasetError::DuplicateSampleId { .. })));
    }

    #[test]
    fn empty_dataset_short_circuits() {
        let config = DatasetConfig::default().with_class_balance("y");
        let dataset =
            Dataset::new(FixedTask { samples: Vec::new() }, &config, Split::Test).unwrap();

        assert!(dataset.is_empty());
        assert_eq!(dataset.len(), 0);
        assert!(dataset.weights().is_none());
        assert!(dataset.summary().is_none());
    }

    #[test]
    fn summary_names_split_and_dataset() {
        let config = DatasetConfig::default().with_dataset_name("condensates");
        let dataset = Dataset::new(
            FixedTask {
                samples: labelled(&[0]),
            },
            &config,
            Split::Dev,
        )
        .unwrap();

        let summary = dataset.summary().unwrap_or_default();
        assert!(summary.starts_with("DEV DATASET CREATED FOR CONDENSATES."));
        assert!(summary.ends_with("1 samples"));
    }

    #[test]
    fn weights_only_when_class_balanced() {
        let task = || FixedTask {
            samples: labelled(&[0, 0, 1]),
        };

        let plain = Dataset::new(task(), &DatasetConfig::default(), Split::Train).unwrap();
        assert!(plain.weights().is_none());

        let config = DatasetConfig::default().with_class_balance("y");
        let balanced = Dataset::new(task(), &config, Split::Train).unwrap();
        assert_eq!(balanced.weights().map(<[f64]>::len), Some(3));
    }

    #[test]
    fn missing_metadata_path_is_a_config_error() {
        struct DefaultLoad;

        impl DatasetTask for DefaultLoad {
            fn create_dataset(
                &self,
                _metadata: Metadata,
                _split: Split,
                _config: &DatasetConfig,
            ) -> Result<Vec<Sample>> {
                Ok(Vec::new())
            }
            fn skip_sample(&self, _sample: &Sample) -> bool {
                false
            }
            fn check_label(&self, _sample: &Sample) -> bool {
                true
            }
            fn get_label(&self, _sample: &Sample) -> Option<usize> {
                None
            }
            fn summary_statement(&self, _samples: &[Sample]) -> String {
                String::new()
            }
        }

        let result = Dataset::new(DefaultLoad, &DatasetConfig::default(), Split::Train);
        assert!(matches!(result, Err(DatasetError::InvalidConfig(_))));
        assert_eq!(DefaultLoad.item_keys(), DEFAULT_ITEM_KEYS);
    }

    #[test]
    fn corrupt_items_are_skipped_during_iteration() {
        let mut samples = labelled(&[0, 1, 2]);
        samples[1] = samples[1].clone().with_field("corrupt", true);

        let dataset =
            Dataset::new(FixedTask { samples }, &DatasetConfig::default(), Split::Train).unwrap();

        assert_eq!(dataset.len(), 3);
        assert!(dataset.item(1).is_err());
        assert!(BurnDataset::get(&dataset, 1).is_none());
        assert!(BurnDataset::get(&dataset, 0).is_some());
        assert!(BurnDataset::get(&dataset, 3).is_none());

        let ids: Vec<String> = dataset.iter_items().map(|s| s.sample_id).collect();
        assert_eq!(ids, vec!["s0", "s2"]);
    }

    #[test]
    fn batch_fields_keep_item_keys_only() {
        let samples = vec![Sample::new("s0").with_field("y", 1).with_field("x", "MKV")];
        let dataset =
            Dataset::new(FixedTask { samples }, &DatasetConfig::default(), Split::Train).unwrap();

        let fields = dataset.batch_fields(0).unwrap();
        assert_eq!(fields.sample_id, "s0");
        assert!(fields.get("y").is_none());
        assert!(fields.get("x").is_none());
        assert!(dataset.batch_fields(1).is_err());
    }

    #[test]
    fn boxed_tasks_are_tasks() {
        let task: Box<dyn DatasetTask> = Box::new(FixedTask {
            samples: labelled(&[1, 1]),
        });
        let dataset = Dataset::new(task, &DatasetConfig::default(), Split::Train).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(BurnDataset::len(&dataset), 2);
    }
}
