//! Model configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Configuration shared by every registered model component.
///
/// A composite model hands the same config (or a clone of it) to each
/// component it builds, so encoder and head options live side by side.
///
/// # Example
///
/// ```
/// use prot_models::ModelConfig;
///
/// let config = ModelConfig::default()
///     .with_mlp_input_dim(1280)
///     .with_layer_configuration(vec![256])
///     .with_num_classes(5);
///
/// assert_eq!(config.model_name_for_encoder, "identity");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Registered name of the encoder used by the classifier.
    pub model_name_for_encoder: String,

    /// Width of the features fed to the MLP head.
    pub mlp_input_dim: usize,

    /// Hidden layer sizes of the MLP head, in order.
    pub mlp_layer_configuration: Vec<usize>,

    /// Normalize hidden layers with batch norm.
    pub mlp_use_batch_norm: bool,

    /// Normalize hidden layers with layer norm (ignored with batch norm).
    pub mlp_use_layer_norm: bool,

    /// Dropout probability after each hidden layer.
    pub dropout: f64,

    /// Number of output classes.
    pub num_classes: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name_for_encoder: "identity".to_string(),
            mlp_input_dim: 512,
            mlp_layer_configuration: vec![128, 128],
            mlp_use_batch_norm: false,
            mlp_use_layer_norm: false,
            dropout: 0.0,
            num_classes: 6,
        }
    }
}

impl ModelConfig {
    /// Loads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO or serialization error if the file cannot be read or
    /// parsed, or [`ModelError::InvalidConfig`] if it fails validation.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the encoder name.
    #[must_use]
    pub fn with_encoder(mut self, name: impl Into<String>) -> Self {
        self.model_name_for_encoder = name.into();
        self
    }

    /// Sets the MLP input width.
    #[must_use]
    pub const fn with_mlp_input_dim(mut self, mlp_input_dim: usize) -> Self {
        self.mlp_input_dim = mlp_input_dim;
        self
    }

    /// Sets the hidden layer sizes.
    #[must_use]
    pub fn with_layer_configuration(mut self, layers: Vec<usize>) -> Self {
        self.mlp_layer_configuration = layers;
        self
    }

    /// Enables batch norm on hidden layers.
    #[must_use]
    pub const fn with_batch_norm(mut self) -> Self {
        self.mlp_use_batch_norm = true;
        self
    }

    /// Enables layer norm on hidden layers.
    #[must_use]
    pub const fn with_layer_norm(mut self) -> Self {
        self.mlp_use_layer_norm = true;
        self
    }

    /// Sets the dropout probability.
    #[must_use]
    pub const fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Sets the number of classes.
    #[must_use]
    pub const fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Width of the last hidden layer, or the input width without hidden
    /// layers.
    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.mlp_layer_configuration
            .last()
            .copied()
            .unwrap_or(self.mlp_input_dim)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.model_name_for_encoder.is_empty() {
            return Err(ModelError::invalid_config(
                "model_name_for_encoder must not be empty",
            ));
        }
        if self.mlp_input_dim == 0 {
            return Err(ModelError::invalid_config("mlp_input_dim must be > 0"));
        }
        if self.mlp_layer_configuration.contains(&0) {
            return Err(ModelError::invalid_config(
                "mlp_layer_configuration sizes must be > 0",
            ));
        }
        if self.num_classes == 0 {
            return Err(ModelError::invalid_config("num_classes must be > 0"));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::invalid_config(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }
}
