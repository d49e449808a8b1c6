//! Error types for prot-dataset crate.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur in prot-dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Metadata file is missing or not valid JSON.
    #[error("failed to load metadata from {path}: {reason}")]
    MetadataLoad {
        /// Path to the metadata file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Cluster map file is missing or not valid JSON.
    #[error("failed to load cluster map from {path}: {reason}")]
    ClusterMapLoad {
        /// Path to the cluster map file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// A metadata record has no entry in the cluster map.
    #[error("record {index} has no cluster assignment")]
    MissingClusterAssignment {
        /// Index of the record in the metadata file.
        index: usize,
    },

    /// Sample index past the end of the dataset.
    #[error("sample index {index} out of range for dataset of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Dataset length.
        len: usize,
    },

    /// Failed to load a single sample.
    #[error("failed to load sample {id}: {reason}")]
    LoadSample {
        /// Sample ID.
        id: String,
        /// Reason for failure.
        reason: String,
    },

    /// A sample lacks a field the operation needs.
    #[error("sample {sample_id} has no field '{key}'")]
    MissingField {
        /// Sample ID.
        sample_id: String,
        /// Missing key.
        key: String,
    },

    /// Two samples of one dataset share an ID.
    #[error("duplicate sample id '{id}'")]
    DuplicateSampleId {
        /// Repeated sample ID.
        id: String,
    },

    /// Split probabilities are negative or do not sum to 1.
    #[error("invalid split probabilities {0:?} (must be non-negative and sum to 1)")]
    InvalidSplitProbabilities([f64; 3]),

    /// Invalid dataset configuration.
    #[error("invalid dataset configuration: {0}")]
    InvalidConfig(String),

    /// Component lookup failed.
    #[error(transparent)]
    Registry(#[from] prot_registry::RegistryError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DatasetError {
    /// Creates a metadata load error.
    #[must_use]
    pub fn metadata_load(path: &Path, reason: impl ToString) -> Self {
        Self::MetadataLoad {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a cluster map load error.
    #[must_use]
    pub fn cluster_map_load(path: &Path, reason: impl ToString) -> Self {
        Self::ClusterMapLoad {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a missing cluster assignment error.
    #[must_use]
    pub const fn missing_cluster_assignment(index: usize) -> Self {
        Self::MissingClusterAssignment { index }
    }

    /// Creates an index out of range error.
    #[must_use]
    pub const fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Creates a load sample error.
    #[must_use]
    pub fn load_sample(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadSample {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(sample_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingField {
            sample_id: sample_id.into(),
            key: key.into(),
        }
    }

    /// Creates a duplicate sample ID error.
    #[must_use]
    pub fn duplicate_sample_id(id: impl Into<String>) -> Self {
        Self::DuplicateSampleId { id: id.into() }
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for prot-dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_metadata_load_embeds_path_and_cause() {
        let err = DatasetError::metadata_load(Path::new("/data/meta.json"), "not found");
        assert!(err.to_string().contains("/data/meta.json"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn error_cluster_map_load() {
        let err = DatasetError::cluster_map_load(Path::new("clusters.json"), "bad json");
        assert!(err.to_string().contains("clusters.json"));
        assert!(err.to_string().contains("bad json"));
    }

    #[test]
    fn error_missing_cluster_assignment() {
        let err = DatasetError::missing_cluster_assignment(7);
        assert!(err.to_string().contains("record 7"));
    }

    #[test]
    fn error_index_out_of_range() {
        let err = DatasetError::index_out_of_range(10, 10);
        assert!(err.to_string().contains("index 10"));
        assert!(err.to_string().contains("length 10"));
    }

    #[test]
    fn error_load_sample() {
        let err = DatasetError::load_sample("P12345", "truncated");
        assert!(err.to_string().contains("P12345"));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn error_missing_field() {
        let err = DatasetError::missing_field("P12345", "y");
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn error_duplicate_sample_id() {
        let err = DatasetError::duplicate_sample_id("P1");
        assert_eq!(err.to_string(), "duplicate sample id 'P1'");
    }

    #[test]
    fn error_invalid_split_probabilities() {
        let err = DatasetError::InvalidSplitProbabilities([0.5, 0.5, 0.5]);
        assert!(err.to_string().contains("sum to 1"));
    }

    #[test]
    fn error_from_registry_error() {
        let err: DatasetError =
            prot_registry::RegistryError::unknown("x", prot_registry::Category::Dataset).into();
        assert!(matches!(err, DatasetError::Registry(_)));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }

    #[test]
    fn error_from_serde_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: DatasetError = json_err.into();
        assert!(matches!(err, DatasetError::Serialization(_)));
    }
}
