//! Model trait, batch containers and the model registry.

use std::collections::BTreeMap;
use std::fmt;

use burn::prelude::Backend;
use burn::tensor::Tensor;
use prot_registry::{Category, Registry};

use crate::classifier::Classifier;
use crate::config::ModelConfig;
use crate::encoder::IdentityEncoder;
use crate::error::{ModelError, Result};
use crate::mlp::MlpClassifier;

/// Registered name of [`Classifier`].
pub const CLASSIFIER: &str = "classifier";
/// Registered name of [`MlpClassifier`].
pub const MLP_CLASSIFIER: &str = "mlp_classifier";
/// Registered name of [`IdentityEncoder`].
pub const IDENTITY: &str = "identity";

/// Named input tensors of one batch, each `[batch_size, features]`.
pub type Batch<B> = BTreeMap<String, Tensor<B, 2>>;

/// Named output tensors of a forward pass.
pub type ModelOutput<B> = BTreeMap<String, Tensor<B, 2>>;

/// Returns the tensor stored under `key`.
///
/// # Errors
///
/// Returns [`ModelError::MissingInput`] if the batch has no such key.
pub fn batch_input<'a, B: Backend>(batch: &'a Batch<B>, key: &str) -> Result<&'a Tensor<B, 2>> {
    batch.get(key).ok_or_else(|| ModelError::missing_input(key))
}

/// A model component that maps a batch to named outputs.
///
/// Every built-in component is also a burn [`Module`](burn::module::Module).
/// The trait stays object safe so a [`ModelRegistry`] can hand components
/// out as `Box<dyn Model<B>>`; training code keeps the concrete module.
pub trait Model<B: Backend>: fmt::Debug + Send {
    /// Runs the forward pass.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingInput`] if the batch lacks a tensor the
    /// model reads.
    fn forward(&self, batch: &Batch<B>) -> Result<ModelOutput<B>>;
}

/// Signature of a registered model constructor.
pub type BuildFn<B> =
    fn(&ModelConfig, &ModelRegistry<B>, &<B as Backend>::Device) -> Result<Box<dyn Model<B>>>;

/// Constructor stored in a [`ModelRegistry`].
///
/// Constructors receive the registry itself so composite models can build
/// their parts by name.
pub struct ModelFactory<B: Backend>(BuildFn<B>);

impl<B: Backend> ModelFactory<B> {
    /// Wraps a constructor.
    #[must_use]
    pub const fn new(build: BuildFn<B>) -> Self {
        Self(build)
    }

    /// Builds the model.
    ///
    /// # Errors
    ///
    /// Returns whatever the constructor returns.
    pub fn build(
        &self,
        config: &ModelConfig,
        registry: &ModelRegistry<B>,
        device: &B::Device,
    ) -> Result<Box<dyn Model<B>>> {
        (self.0)(config, registry, device)
    }
}

impl<B: Backend> Clone for ModelFactory<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Backend> Copy for ModelFactory<B> {}

impl<B: Backend> fmt::Debug for ModelFactory<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModelFactory")
    }
}

/// Registry of model constructors for backend `B`.
pub type ModelRegistry<B> = Registry<ModelFactory<B>>;

/// Signature of a registered encoder constructor.
pub type EncoderFn<B, E> = fn(&ModelConfig, &<B as Backend>::Device) -> Result<E>;

/// Encoder constructor stored in an [`EncoderRegistry`].
///
/// `E` is the concrete encoder module, usually an enum deriving
/// [`Module`](burn::module::Module) over every encoder a project registers.
pub struct EncoderFactory<B: Backend, E>(EncoderFn<B, E>);

impl<B: Backend, E> EncoderFactory<B, E> {
    /// Wraps a constructor.
    #[must_use]
    pub const fn new(build: EncoderFn<B, E>) -> Self {
        Self(build)
    }

    /// Builds the encoder.
    ///
    /// # Errors
    ///
    /// Returns whatever the constructor returns.
    pub fn build(&self, config: &ModelConfig, device: &B::Device) -> Result<E> {
        (self.0)(config, device)
    }
}

impl<B: Backend, E> Clone for EncoderFactory<B, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Backend, E> Copy for EncoderFactory<B, E> {}

impl<B: Backend, E> fmt::Debug for EncoderFactory<B, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncoderFactory")
    }
}

/// Registry of encoder constructors producing modules of type `E`.
pub type EncoderRegistry<B, E> = Registry<EncoderFactory<B, E>>;

/// Returns an encoder registry holding [`IdentityEncoder`] as `"identity"`.
///
/// # Errors
///
/// Only fails if two built-ins share a name.
pub fn builtin_encoders<B: Backend>() -> Result<EncoderRegistry<B, IdentityEncoder<B>>> {
    let mut registry = EncoderRegistry::new();
    registry.register(
        IDENTITY,
        Category::Model,
        EncoderFactory::new(identity_encoder::<B>),
    )?;
    Ok(registry)
}

/// Returns a registry holding the built-in model components.
///
/// # Errors
///
/// Only fails if two built-ins share a name.
pub fn builtin_registry<B: Backend>() -> Result<ModelRegistry<B>> {
    let mut registry = ModelRegistry::new();
    registry.register(
        CLASSIFIER,
        Category::Model,
        ModelFactory::new(build_classifier::<B>),
    )?;
    registry.register(
        MLP_CLASSIFIER,
        Category::Model,
        ModelFactory::new(build_mlp_classifier::<B>),
    )?;
    registry.register(
        IDENTITY,
        Category::Model,
        ModelFactory::new(build_identity::<B>),
    )?;
    Ok(registry)
}

/// Builds the model registered under `name`.
///
/// # Errors
///
/// Returns [`ModelError::Registry`] for an unknown name, plus any
/// construction error.
pub fn build_model<B: Backend>(
    registry: &ModelRegistry<B>,
    name: &str,
    config: &ModelConfig,
    device: &B::Device,
) -> Result<Box<dyn Model<B>>> {
    registry
        .resolve(name, Category::Model)?
        .build(config, registry, device)
}

fn build_classifier<B: Backend>(
    config: &ModelConfig,
    _registry: &ModelRegistry<B>,
    device: &B::Device,
) -> Result<Box<dyn Model<B>>> {
    let encoders = builtin_encoders::<B>()?;
    Ok(Box::new(Classifier::new(config, &encoders, device)?))
}

fn build_mlp_classifier<B: Backend>(
    config: &ModelConfig,
    _registry: &ModelRegistry<B>,
    device: &B::Device,
) -> Result<Box<dyn Model<B>>> {
    Ok(Box::new(MlpClassifier::new(config, device)?))
}

fn build_identity<B: Backend>(
    config: &ModelConfig,
    _registry: &ModelRegistry<B>,
    device: &B::Device,
) -> Result<Box<dyn Model<B>>> {
    Ok(Box::new(identity_encoder::<B>(config, device)?))
}

#[allow(clippy::unnecessary_wraps)]
fn identity_encoder<B: Backend>(
    _config: &ModelConfig,
    _device: &B::Device,
) -> Result<IdentityEncoder<B>> {
    Ok(IdentityEncoder::new())
}
