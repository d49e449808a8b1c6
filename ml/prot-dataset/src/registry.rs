//! Dataset tasks selectable by name.

use prot_registry::{Category, Registry};

use crate::config::DatasetConfig;
use crate::dataset::{Dataset, DatasetTask};
use crate::error::Result;
use crate::protein::ProteinSequenceTask;
use crate::splits::Split;

/// Builds a dataset task from configuration.
pub type DatasetFactory = fn(&DatasetConfig) -> Result<Box<dyn DatasetTask>>;

/// Registry of dataset task constructors.
pub type DatasetRegistry = Registry<DatasetFactory>;

fn protein_sequences(config: &DatasetConfig) -> Result<Box<dyn DatasetTask>> {
    Ok(Box::new(ProteinSequenceTask::from_config(config)))
}

/// Returns a registry holding the built-in dataset tasks.
///
/// # Errors
///
/// Only fails if two built-ins share a name.
pub fn builtin_datasets() -> Result<DatasetRegistry> {
    let mut registry = DatasetRegistry::new();
    registry.register("protein_sequences", Category::Dataset, protein_sequences)?;
    Ok(registry)
}

/// Builds the dataset named by `config.dataset_name`.
///
/// # Errors
///
/// Returns [`DatasetError::Registry`](crate::DatasetError::Registry) for an
/// unknown name, plus any dataset construction error.
pub fn build_dataset(
    registry: &DatasetRegistry,
    config: &DatasetConfig,
    split: Split,
) -> Result<Dataset<Box<dyn DatasetTask>>> {
    let factory = registry.resolve(&config.dataset_name, Category::Dataset)?;
    let task = factory(config)?;
    Dataset::new(task, config, split)
}
