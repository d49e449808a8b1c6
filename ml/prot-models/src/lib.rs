//! Burn model components for protein classification.
//!
//! Models are assembled by name from a [`ModelRegistry`], so a configuration
//! file decides which encoder feeds the classification head.
//!
//! # Model Components
//!
//! - [`Classifier`] (`"classifier"`) - Named encoder followed by an MLP head
//! - [`MlpClassifier`] (`"mlp_classifier"`) - Configurable MLP head
//! - [`IdentityEncoder`] (`"identity"`) - Pass-through for precomputed embeddings
//!
//! Every component is a burn `Module` and implements [`Model`]: it reads
//! named tensors from a [`Batch`] and returns named tensors in a
//! [`ModelOutput`].
//!
//! # Registries
//!
//! - [`ModelRegistry`] builds any component by name as `Box<dyn Model<B>>`
//! - [`EncoderRegistry`] builds concrete encoder modules by name; a
//!   [`Classifier`] resolves its encoder from one and stays trainable
//!
//! # Backend Support
//!
//! Components are generic over Burn backends. Tests use `burn-ndarray`
//! (`NdArray<f32>`).
//!
//! # Example
//!
//! ```
//! use burn::tensor::Tensor;
//! use burn_ndarray::NdArray;
//! use prot_models::{Batch, Model, ModelConfig, build_model, builtin_registry};
//!
//! type B = NdArray<f32>;
//!
//! let device = Default::default();
//! let registry = builtin_registry::<B>()?;
//! let config = ModelConfig::default().with_mlp_input_dim(64).with_num_classes(5);
//! let model = build_model(&registry, "classifier", &config, &device)?;
//!
//! let batch = Batch::from([("x".to_string(), Tensor::<B, 2>::zeros([8, 64], &device))]);
//! let output = model.forward(&batch)?;
//! assert_eq!(output["logit"].dims(), [8, 5]);
//! # Ok::<(), prot_models::ModelError>(())
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

mod classifier;
mod config;
mod encoder;
mod error;
mod mlp;
mod model;

// Re-export model components
pub use classifier::{Classifier, ENCODER_HIDDEN};
pub use encoder::IdentityEncoder;
pub use mlp::{MlpBlock, MlpClassifier};

// Re-export model plumbing
pub use model::{
    Batch, BuildFn, CLASSIFIER, EncoderFactory, EncoderFn, EncoderRegistry, IDENTITY,
    MLP_CLASSIFIER, Model, ModelFactory, ModelOutput, ModelRegistry, batch_input, build_model,
    builtin_encoders, builtin_registry,
};

// Re-export configuration
pub use config::ModelConfig;

// Re-export error types
pub use error::{ModelError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Batch, Classifier, EncoderRegistry, IdentityEncoder, MlpClassifier, Model, ModelConfig,
        ModelError, ModelOutput, ModelRegistry, build_model, builtin_encoders, builtin_registry,
    };
}
