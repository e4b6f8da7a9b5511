//! ONNX-backed risk model inference

use crate::error::{PipelineError, Result};
use crate::features::FEATURE_COUNT;
use crate::model::loader::{LoadedArtifact, ModelLoader};
use crate::model::RiskModel;
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

/// Risk model backed by a single trained ONNX artifact.
///
/// The session requires `&mut self` to run, so it sits behind a `RwLock`;
/// the model itself is immutable after load and shared via `Arc`.
pub struct OnnxRiskModel {
    artifact: RwLock<LoadedArtifact>,
    feature_count: usize,
}

impl OnnxRiskModel {
    /// Load the trained artifact once at process start.
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let loader = ModelLoader::with_threads(onnx_threads)?;
        let artifact = loader.load(path)?;

        Ok(Self {
            artifact: RwLock::new(artifact),
            feature_count: FEATURE_COUNT,
        })
    }

    /// Extract the fraud-class probability from the session outputs.
    ///
    /// Handles both plain tensor outputs and the seq(map(int64, float))
    /// shape that scikit-learn ONNX exports produce.
    fn extract_probability(
        &self,
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
    ) -> Result<f64> {
        if let Some(output) = outputs.get(output_name) {
            let dtype = output.dtype();

            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let dims: Vec<i64> = shape.iter().copied().collect();
                if let Some(prob) = fraud_probability_from_tensor(&dims, data) {
                    debug!(prob = prob, "Extracted probability from tensor output");
                    return Ok(prob);
                }
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(output) {
                    debug!(prob = prob, "Extracted probability from seq(map) output");
                    return Ok(prob);
                }
            }
        }

        // Fallback: scan all outputs, skipping the class-label output
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let dims: Vec<i64> = shape.iter().copied().collect();
                if let Some(prob) = fraud_probability_from_tensor(&dims, data) {
                    debug!(output = %name, prob = prob, "Extracted probability from tensor output (fallback)");
                    return Ok(prob);
                }
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(&output) {
                    debug!(output = %name, prob = prob, "Extracted probability from seq(map) output (fallback)");
                    return Ok(prob);
                }
            }
        }

        Err(PipelineError::Inference(format!(
            "no fraud probability found in model output {output_name:?}"
        )))
    }
}

impl RiskModel for OnnxRiskModel {
    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn score(&self, features: &[f32]) -> Result<f64> {
        if features.len() != self.feature_count {
            return Err(PipelineError::FeatureShape {
                expected: self.feature_count,
                actual: features.len(),
            });
        }

        let mut artifact = self
            .artifact
            .write()
            .map_err(|e| PipelineError::Inference(format!("model lock poisoned: {e}")))?;

        // Input tensor shape is [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| PipelineError::Inference(format!("failed to create input tensor: {e}")))?;

        let input_name = artifact.input_name.clone();
        let output_name = artifact.output_name.clone();

        let outputs = artifact
            .session
            .run(ort::inputs![&input_name => input_tensor])
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        self.extract_probability(&outputs, &output_name)
    }
}

/// Extract the fraud-class probability from raw tensor data.
///
/// Binary classifiers emit either `[batch, 2]` class probabilities (fraud is
/// class 1) or `[batch, 1]` single probabilities.
fn fraud_probability_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let num_classes = match dims {
        [_, n] => *n as usize,
        [n] => *n as usize,
        _ => return None,
    };

    if num_classes >= 2 && data.len() >= 2 {
        Some(data[1] as f64)
    } else if num_classes == 1 && !data.is_empty() {
        Some(data[0] as f64)
    } else {
        None
    }
}

/// Extract probability from a seq(map(int64, float)) output.
///
/// scikit-learn exports (skl2onnx with the default ZipMap) produce this
/// shape for `predict_proba`.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| PipelineError::Inference(format!("failed to downcast to sequence: {e}")))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| PipelineError::Inference(e.to_string()))?;

    if maps.is_empty() {
        return Err(PipelineError::Inference("empty output sequence".to_string()));
    }

    // Batch size is always 1; the single map holds class -> probability
    let kv_pairs = maps[0]
        .try_extract_key_values::<i64, f32>()
        .map_err(|e| PipelineError::Inference(e.to_string()))?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }

    // Degenerate single-class map: invert the non-fraud probability
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    Err(PipelineError::Inference(
        "no class probability found in map output".to_string(),
    ))
}
