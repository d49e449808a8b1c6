//! Pass-through encoder for precomputed embeddings.

use std::marker::PhantomData;

use burn::module::Module;
use burn::prelude::Backend;

use crate::error::Result;
use crate::model::{Batch, Model, ModelOutput, batch_input};

/// Encoder that returns its input features unchanged.
///
/// Use it when `batch["x"]` already holds embeddings computed offline, e.g.
/// by a protein language model, so only the MLP head is trained.
///
/// Reads `"x"`, returns `{"hidden": x}`. Has no parameters.
#[derive(Debug, Module)]
pub struct IdentityEncoder<B: Backend> {
    _backend: PhantomData<B>,
}

impl<B: Backend> IdentityEncoder<B> {
    /// Creates the encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B: Backend> Default for IdentityEncoder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Model<B> for IdentityEncoder<B> {
    fn forward(&self, batch: &Batch<B>) -> Result<ModelOutput<B>> {
        let x = batch_input(batch, "x")?;
        Ok(ModelOutput::from([("hidden".to_string(), x.clone())]))
    }
}
