//! Risk model inference components

pub mod loader;
pub mod onnx;

pub use loader::ModelLoader;
pub use onnx::OnnxRiskModel;

use crate::error::Result;

/// A pre-trained binary classifier producing fraud probabilities.
///
/// Implementations are process-wide immutable state: loaded once at startup
/// and passed into the orchestrator as an explicit handle. Scoring must be
/// deterministic — identical input, identical probability.
pub trait RiskModel: Send + Sync {
    /// Length of the feature vector the model was trained on.
    fn feature_count(&self) -> usize;

    /// Score one feature vector, returning a fraud probability in [0, 1].
    ///
    /// Fails with [`crate::error::PipelineError::FeatureShape`] when the
    /// input length does not match [`RiskModel::feature_count`].
    fn score(&self, features: &[f32]) -> Result<f64>;
}
