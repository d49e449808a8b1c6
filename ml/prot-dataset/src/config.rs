//! Dataset configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::splits::{SplitProbabilities, SplitType};

/// Default location of the mmseqs cluster map.
pub const DEFAULT_CLUSTER_MAP_PATH: &str = "data/mmseqs_row2cluster_30seq_80cov.json";

/// Configuration for building a dataset.
///
/// Missing fields take their default when deserialized, so a config file
/// only needs the options it changes.
///
/// # Example
///
/// ```
/// use prot_dataset::{DatasetConfig, SplitType};
///
/// let config = DatasetConfig::new("data/proteins.json")
///     .with_class_balance("y")
///     .with_assigned_splits(SplitType::Mmseqs, 7);
///
/// assert!(config.class_bal);
/// assert_eq!(config.split_seed, 7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Registered name of the dataset task.
    pub dataset_name: String,

    /// Path to the metadata JSON file.
    pub dataset_file_path: Option<PathBuf>,

    /// Directory with auxiliary data files.
    pub data_dir: Option<PathBuf>,

    /// Compute class-balanced sample weights.
    pub class_bal: bool,

    /// Sample field used to group samples for class balancing.
    pub class_bal_key: String,

    /// Number of classes to predict.
    pub num_classes: usize,

    /// Assign new splits instead of trusting the ones in the metadata.
    pub assign_splits: bool,

    /// Strategy used when `assign_splits` is set.
    pub split_type: SplitType,

    /// Train/dev/test fractions.
    pub split_probs: SplitProbabilities,

    /// Seed for split assignment.
    pub split_seed: u64,

    /// Record → cluster map used by [`SplitType::Mmseqs`].
    pub cluster_map_path: PathBuf,

    /// Longest protein sequence kept in the dataset.
    pub max_sequence_length: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset_name: "protein_sequences".to_string(),
            dataset_file_path: None,
            data_dir: None,
            class_bal: false,
            class_bal_key: "y".to_string(),
            num_classes: 6,
            assign_splits: false,
            split_type: SplitType::Random,
            split_probs: SplitProbabilities::default(),
            split_seed: 0,
            cluster_map_path: PathBuf::from(DEFAULT_CLUSTER_MAP_PATH),
            max_sequence_length: 1800,
        }
    }
}

impl DatasetConfig {
    /// Creates a config reading metadata from `path`.
    #[must_use]
    pub fn new(dataset_file_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_file_path: Some(dataset_file_path.into()),
            ..Self::default()
        }
    }

    /// Loads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO or serialization error if the file cannot be read or
    /// parsed, or [`DatasetError::InvalidConfig`] if it fails validation.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the registered dataset name.
    #[must_use]
    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }

    /// Sets the auxiliary data directory.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Enables class balancing on `key`.
    #[must_use]
    pub fn with_class_balance(mut self, key: impl Into<String>) -> Self {
        self.class_bal = true;
        self.class_bal_key = key.into();
        self
    }

    /// Sets the number of classes.
    #[must_use]
    pub const fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Enables split assignment with the given strategy and seed.
    #[must_use]
    pub const fn with_assigned_splits(mut self, split_type: SplitType, seed: u64) -> Self {
        self.assign_splits = true;
        self.split_type = split_type;
        self.split_seed = seed;
        self
    }

    /// Sets the split probabilities.
    #[must_use]
    pub const fn with_split_probs(mut self, split_probs: SplitProbabilities) -> Self {
        self.split_probs = split_probs;
        self
    }

    /// Sets the cluster map path.
    #[must_use]
    pub fn with_cluster_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cluster_map_path = path.into();
        self
    }

    /// Sets the longest sequence kept.
    #[must_use]
    pub const fn with_max_sequence_length(mut self, max_sequence_length: usize) -> Self {
        self.max_sequence_length = max_sequence_length;
        self
    }

    /// Returns the cluster map path, relative paths resolved against
    /// `data_dir` when one is set.
    #[must_use]
    pub fn resolved_cluster_map_path(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) if self.cluster_map_path.is_relative() => dir.join(&self.cluster_map_path),
            _ => self.cluster_map_path.clone(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.dataset_name.is_empty() {
            return Err(DatasetError::invalid_config("dataset_name must not be empty"));
        }
        if self.num_classes == 0 {
            return Err(DatasetError::invalid_config("num_classes must be > 0"));
        }
        if self.class_bal && self.class_bal_key.is_empty() {
            return Err(DatasetError::invalid_config(
                "class_bal_key must be set when class_bal is enabled",
            ));
        }
        if self.max_sequence_length == 0 {
            return Err(DatasetError::invalid_config(
                "max_sequence_length must be > 0",
            ));
        }
        Ok(())
    }
}
