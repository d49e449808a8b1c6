//! Dataset lifecycle for protein classification.
//!
//! This crate turns a JSON metadata file into train/dev/test datasets:
//!
//! # Dataset Core
//!
//! - [`DatasetTask`] - Task-specific sample creation and label checks
//! - [`Dataset`] - Indexable samples of one split, with optional weights
//! - [`ProteinSequenceTask`] - Sequence → class index task
//!
//! # Split Assignment
//!
//! - [`assign_splits`] - Random or cluster-grouped train/dev/test labels
//! - [`ClusterMap`] - Precomputed record → sequence cluster map
//! - [`SplitProbabilities`] - Validated train/dev/test fractions
//!
//! # Class Balance
//!
//! - [`class_balanced_weights`] - Inverse-frequency sample weights
//!
//! # Batching
//!
//! [`Dataset`] implements burn's `Dataset` trait, so it can be handed to a
//! burn `DataLoader` directly. Samples that fail to load are logged and
//! skipped rather than aborting the epoch.
//!
//! # Example
//!
//! ```no_run
//! use prot_dataset::{Dataset, DatasetConfig, ProteinSequenceTask, Split, SplitType};
//!
//! let config = DatasetConfig::new("data/proteins.json")
//!     .with_num_classes(5)
//!     .with_class_balance("y")
//!     .with_assigned_splits(SplitType::Mmseqs, 0);
//!
//! let task = ProteinSequenceTask::from_config(&config);
//! let train = Dataset::new(task, &config, Split::Train)?;
//! println!("{} training samples", train.len());
//! # Ok::<(), prot_dataset::DatasetError>(())
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cluster;
mod config;
mod dataset;
mod error;
mod metadata;
mod protein;
mod registry;
mod sample;
mod splits;
mod weights;

// Re-export dataset core
pub use dataset::{DEFAULT_ITEM_KEYS, Dataset, DatasetTask};
pub use protein::{INPUT_KEY, LABEL_KEY, ProteinSequenceTask, SAMPLE_ID_KEY, SEQUENCE_KEY};
pub use sample::Sample;

// Re-export metadata and configuration
pub use config::{DEFAULT_CLUSTER_MAP_PATH, DatasetConfig};
pub use metadata::{Metadata, MetadataRecord, SPLIT_KEY, load_metadata};

// Re-export split utilities
pub use cluster::{ClusterId, ClusterMap};
pub use splits::{
    Split, SplitCounts, SplitProbabilities, SplitStrategy, SplitType, assign_configured_splits,
    assign_splits, record_split, split_counts,
};

// Re-export class balance
pub use weights::{class_balanced_weights, label_counts, label_key};

// Re-export registry
pub use registry::{DatasetFactory, DatasetRegistry, build_dataset, builtin_datasets};

// Re-export error types
pub use error::{DatasetError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ClusterMap, Dataset, DatasetConfig, DatasetError, DatasetTask, ProteinSequenceTask,
        Sample, Split, SplitProbabilities, SplitStrategy, SplitType, assign_splits,
        class_balanced_weights,
    };
}
