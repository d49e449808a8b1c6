//! Multi-layer perceptron classification head.

use burn::module::Module;
use burn::nn;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::relu;
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::model::{Batch, Model, ModelOutput, batch_input};

/// One hidden layer: Linear -> optional norm -> `ReLU` -> Dropout.
#[derive(Debug, Module)]
pub struct MlpBlock<B: Backend> {
    linear: nn::Linear<B>,
    batch_norm: Option<nn::BatchNorm<B, 0>>,
    layer_norm: Option<nn::LayerNorm<B>>,
    dropout: nn::Dropout,
}

impl<B: Backend> MlpBlock<B> {
    /// Creates a block mapping `input_dim` features to `output_dim`.
    ///
    /// Batch norm wins when both norms are enabled.
    #[must_use]
    pub fn new(
        input_dim: usize,
        output_dim: usize,
        config: &ModelConfig,
        device: &B::Device,
    ) -> Self {
        let batch_norm = config
            .mlp_use_batch_norm
            .then(|| nn::BatchNormConfig::new(output_dim).init(device));
        let layer_norm = (!config.mlp_use_batch_norm && config.mlp_use_layer_norm)
            .then(|| nn::LayerNormConfig::new(output_dim).init(device));

        Self {
            linear: nn::LinearConfig::new(input_dim, output_dim).init(device),
            batch_norm,
            layer_norm,
            dropout: nn::DropoutConfig::new(config.dropout).init(),
        }
    }

    /// Runs the block on `[batch_size, input_dim]` features.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(input);
        let x = match (&self.batch_norm, &self.layer_norm) {
            (Some(norm), _) => norm.forward(x),
            (None, Some(norm)) => norm.forward(x),
            (None, None) => x,
        };
        self.dropout.forward(relu(x))
    }
}

/// MLP classification head.
///
/// Architecture: `[MlpBlock; layers] -> Linear(hidden, num_classes)`, one
/// block per entry of `mlp_layer_configuration`. With no hidden layers the
/// predictor reads the input directly.
///
/// Reads `"x"` (`[batch_size, mlp_input_dim]`) and returns `"logit"`
/// (`[batch_size, num_classes]`, not probabilities) and `"hidden"` (the
/// output of the last block).
///
/// # Example
///
/// ```
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
/// use prot_models::{Batch, MlpClassifier, Model, ModelConfig};
///
/// type B = NdArray<f32>;
///
/// let device = Default::default();
/// let config = ModelConfig::default()
///     .with_mlp_input_dim(16)
///     .with_layer_configuration(vec![8])
///     .with_num_classes(3);
/// let model = MlpClassifier::<B>::new(&config, &device).unwrap();
///
/// let batch = Batch::from([("x".to_string(), Tensor::<B, 2>::zeros([2, 16], &device))]);
/// let output = model.forward(&batch).unwrap();
/// assert_eq!(output["logit"].dims(), [2, 3]);
/// assert_eq!(output["hidden"].dims(), [2, 8]);
/// ```
#[derive(Debug, Module)]
pub struct MlpClassifier<B: Backend> {
    blocks: Vec<MlpBlock<B>>,
    predictor: nn::Linear<B>,
}

impl<B: Backend> MlpClassifier<B> {
    /// Creates the head from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`](crate::ModelError::InvalidConfig)
    /// if the configuration fails validation.
    pub fn new(config: &ModelConfig, device: &B::Device) -> Result<Self> {
        config.validate()?;
        if config.mlp_use_batch_norm && config.mlp_use_layer_norm {
            debug!("Both batch norm and layer norm requested; using batch norm");
        }

        let mut blocks = Vec::with_capacity(config.mlp_layer_configuration.len());
        let mut cur_dim = config.mlp_input_dim;
        for &layer_size in &config.mlp_layer_configuration {
            blocks.push(MlpBlock::new(cur_dim, layer_size, config, device));
            cur_dim = layer_size;
        }
        let predictor =
            nn::LinearConfig::new(config.hidden_dim(), config.num_classes).init(device);

        debug!(
            "Built MLP head {} -> {:?} -> {}",
            config.mlp_input_dim, config.mlp_layer_configuration, config.num_classes
        );
        Ok(Self { blocks, predictor })
    }

    /// Runs the hidden blocks and the predictor, returning
    /// `(hidden, logit)`.
    pub fn forward_features(&self, input: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let hidden = self
            .blocks
            .iter()
            .fold(input, |x, block| block.forward(x));
        let logit = self.predictor.forward(hidden.clone());
        (hidden, logit)
    }

    /// Returns the number of hidden blocks.
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

impl<B: Backend> Model<B> for MlpClassifier<B> {
    fn forward(&self, batch: &Batch<B>) -> Result<ModelOutput<B>> {
        let x = batch_input(batch, "x")?;
        let (hidden, logit) = self.forward_features(x.clone());
        Ok(ModelOutput::from([
            ("logit".to_string(), logit),
            ("hidden".to_string(), hidden),
        ]))
    }
}
