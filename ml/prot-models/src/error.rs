//! Error types for prot-models crate.

use thiserror::Error;

/// Errors that can occur in prot-models operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Component lookup or registration failed.
    #[error(transparent)]
    Registry(#[from] prot_registry::RegistryError),

    /// Invalid model configuration.
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    /// A batch is missing a tensor the model reads.
    #[error("batch has no input '{0}'")]
    MissingInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a missing input error.
    #[must_use]
    pub fn missing_input(key: impl Into<String>) -> Self {
        Self::MissingInput(key.into())
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for prot-models operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use prot_registry::{Category, RegistryError};

    #[test]
    fn error_invalid_config() {
        let err = ModelError::invalid_config("num_classes must be > 0");
        assert!(err.to_string().contains("num_classes must be > 0"));
    }

    #[test]
    fn error_missing_input() {
        let err = ModelError::missing_input("x");
        assert_eq!(err.to_string(), "batch has no input 'x'");
    }

    #[test]
    fn error_from_registry_error() {
        let err: ModelError = RegistryError::unknown("resnet18", Category::Model).into();
        assert!(matches!(err, ModelError::Registry(_)));
        assert!(err.to_string().contains("resnet18"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: ModelError = io_err.into();
        assert!(matches!(err, ModelError::Io(_)));
    }

    #[test]
    fn error_from_json_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ModelError = json_err.into();
        assert!(matches!(err, ModelError::Serialization(_)));
    }
}
