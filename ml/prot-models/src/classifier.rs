//! Encoder + MLP head classifier assembled from an encoder registry.

use burn::module::Module;
use burn::prelude::Backend;
use prot_registry::Category;
use tracing::info;

use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::mlp::MlpClassifier;
use crate::model::{Batch, CLASSIFIER, EncoderRegistry, Model, ModelOutput};

/// Output key holding the encoder features.
pub const ENCODER_HIDDEN: &str = "encoder_hidden";

/// Classifier composed of a named encoder and an MLP head.
///
/// The encoder is resolved by `model_name_for_encoder` from an
/// [`EncoderRegistry`]; the head is an [`MlpClassifier`] built from its own
/// copy of the configuration so it cannot affect the caller's.
///
/// The classifier is a burn [`Module`]: the parameters of both parts are
/// visited, so it can be optimised, switched to inference with `valid()`,
/// and saved through its record. `E` is any encoder module, typically an
/// enum over the encoders a project registers.
///
/// The forward pass feeds the encoder's `"hidden"` output to the head and
/// returns the head outputs plus `"encoder_hidden"`.
///
/// # Example
///
/// ```
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
/// use prot_models::{Batch, Classifier, Model, ModelConfig, builtin_encoders};
///
/// type B = NdArray<f32>;
///
/// let device = Default::default();
/// let encoders = builtin_encoders::<B>().unwrap();
/// let config = ModelConfig::default().with_mlp_input_dim(32);
/// let model = Classifier::new(&config, &encoders, &device).unwrap();
///
/// let batch = Batch::from([("x".to_string(), Tensor::<B, 2>::zeros([4, 32], &device))]);
/// let output = model.forward(&batch).unwrap();
/// assert_eq!(output["encoder_hidden"].dims(), [4, 32]);
/// assert_eq!(output["logit"].dims(), [4, 6]);
/// ```
#[derive(Debug, Module)]
pub struct Classifier<B: Backend, E> {
    encoder: E,
    head: MlpClassifier<B>,
}

impl<B: Backend, E> Classifier<B, E> {
    /// Builds the encoder through `encoders` and the head from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the configuration is invalid
    /// or names the classifier as its own encoder, [`ModelError::Registry`]
    /// if the encoder is not registered, plus any encoder build error.
    pub fn new(
        config: &ModelConfig,
        encoders: &EncoderRegistry<B, E>,
        device: &B::Device,
    ) -> Result<Self> {
        config.validate()?;
        if config.model_name_for_encoder == CLASSIFIER {
            return Err(ModelError::invalid_config(
                "the classifier cannot be its own encoder",
            ));
        }

        let encoder = encoders
            .resolve(&config.model_name_for_encoder, Category::Model)?
            .build(config, device)?;
        let head_config = config.clone();
        let head = MlpClassifier::new(&head_config, device)?;

        info!(
            "Built classifier: encoder '{}', head {:?} -> {} classes",
            config.model_name_for_encoder, config.mlp_layer_configuration, config.num_classes
        );
        Ok(Self { encoder, head })
    }

    /// Creates a classifier from already built parts.
    #[must_use]
    pub const fn from_parts(encoder: E, head: MlpClassifier<B>) -> Self {
        Self { encoder, head }
    }

    /// Returns the encoder.
    #[must_use]
    pub const fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Returns the classification head.
    #[must_use]
    pub const fn head(&self) -> &MlpClassifier<B> {
        &self.head
    }
}

impl<B: Backend, E: Model<B>> Model<B> for Classifier<B, E> {
    fn forward(&self, batch: &Batch<B>) -> Result<ModelOutput<B>> {
        let mut encoded = self.encoder.forward(batch)?;
        let hidden = encoded
            .remove("hidden")
            .ok_or_else(|| ModelError::missing_input("hidden"))?;

        let (head_hidden, logit) = self.head.forward_features(hidden.clone());
        Ok(ModelOutput::from([
            (ENCODER_HIDDEN.to_string(), hidden),
            ("hidden".to_string(), head_hidden),
            ("logit".to_string(), logit),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::IdentityEncoder;
    use crate::model::{IDENTITY, builtin_encoders};
    use burn::tensor::Tensor;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn device() -> <TestBackend as Backend>::Device {
        <TestBackend as Backend>::Device::default()
    }

    fn config() -> ModelConfig {
        ModelConfig::default()
            .with_mlp_input_dim(20)
            .with_layer_configuration(vec![10])
            .with_num_classes(4)
    }

    fn input(rows: usize) -> Batch<TestBackend> {
        Batch::from([(
            "x".to_string(),
            Tensor::<TestBackend, 2>::ones([rows, 20], &device()),
        )])
    }

    /// Encoder that emits no `"hidden"` key.
    #[derive(Debug)]
    struct SilentEncoder;

    impl Model<TestBackend> for SilentEncoder {
        fn forward(&self, _batch: &Batch<TestBackend>) -> Result<ModelOutput<TestBackend>> {
            Ok(ModelOutput::new())
        }
    }

    #[test]
    fn forward_merges_encoder_and_head_outputs() {
        let encoders = builtin_encoders::<TestBackend>().unwrap();
        let model = Classifier::new(&config(), &encoders, &device()).unwrap();

        let output = model.forward(&input(5)).unwrap();

        let mut keys: Vec<&str> = output.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["encoder_hidden", "hidden", "logit"]);
        assert_eq!(output["encoder_hidden"].dims(), [5, 20]);
        assert_eq!(output["hidden"].dims(), [5, 10]);
        assert_eq!(output["logit"].dims(), [5, 4]);
    }

    #[test]
    fn parameters_come_from_encoder_and_head() {
        let encoders = builtin_encoders::<TestBackend>().unwrap();
        let model = Classifier::new(&config(), &encoders, &device()).unwrap();

        // Identity has none; head is (20*10 + 10) + (10*4 + 4).
        assert_eq!(model.encoder().num_params(), 0);
        assert_eq!(model.head().num_params(), 254);
        assert_eq!(model.num_params(), 254);
    }

    #[test]
    fn record_restores_weights() {
        let encoders = builtin_encoders::<TestBackend>().unwrap();
        let trained = Classifier::new(&config(), &encoders, &device()).unwrap();
        let fresh = Classifier::new(&config(), &encoders, &device()).unwrap();

        let expected = trained.forward(&input(3)).unwrap().remove("logit").unwrap();
        let restored = fresh.load_record(trained.into_record());
        let actual = restored.forward(&input(3)).unwrap().remove("logit").unwrap();

        let diff = (expected - actual).abs().max().into_scalar();
        assert!(diff < 1e-6, "max difference {diff}");
    }

    #[test]
    fn self_encoding_is_rejected() {
        let encoders = builtin_encoders::<TestBackend>().unwrap();
        let config = ModelConfig::default().with_encoder(CLASSIFIER);

        let result = Classifier::new(&config, &encoders, &device());
        assert!(matches!(result, Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_encoder_is_a_registry_error() {
        let encoders = builtin_encoders::<TestBackend>().unwrap();
        let config = ModelConfig::default().with_encoder("resnet18");

        let result = Classifier::new(&config, &encoders, &device());
        assert!(matches!(result, Err(ModelError::Registry(_))));
    }

    #[test]
    fn encoder_without_hidden_output_fails() {
        let config = ModelConfig::default().with_mlp_input_dim(4);
        let head = MlpClassifier::<TestBackend>::new(&config, &device()).unwrap();
        let model = Classifier::from_parts(SilentEncoder, head);

        let x = Tensor::<TestBackend, 2>::ones([1, 4], &device());
        let result = model.forward(&Batch::from([("x".to_string(), x)]));
        assert!(matches!(result, Err(ModelError::MissingInput(key)) if key == "hidden"));
    }

    #[test]
    fn from_parts_keeps_the_given_modules() {
        let head = MlpClassifier::<TestBackend>::new(&config(), &device()).unwrap();
        let model = Classifier::from_parts(IdentityEncoder::new(), head);
        assert_eq!(model.head().num_blocks(), 1);
        assert_eq!(model.forward(&input(2)).unwrap()["logit"].dims(), [2, 4]);
    }

    #[test]
    fn identity_encoder_is_the_default() {
        assert_eq!(ModelConfig::default().model_name_for_encoder, IDENTITY);
    }
}
