//! ONNX artifact loading

use crate::error::{PipelineError, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// A loaded ONNX classifier session with discovered I/O names.
pub struct LoadedArtifact {
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for probabilities
    pub output_name: String,
}

/// Loader for the trained classifier artifact.
pub struct ModelLoader {
    /// Number of intra-op threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a loader with default settings (1 thread).
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a loader with the given intra-op thread count.
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init()
            .commit()
            .map_err(|e| PipelineError::ModelUnavailable(format!("ONNX Runtime init failed: {e}")))?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the classifier artifact from file.
    ///
    /// Happens exactly once at process start; any failure here is fatal to
    /// startup, never recovered per request.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadedArtifact> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = self.onnx_threads, "Loading risk model artifact");

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(self.onnx_threads))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                PipelineError::ModelUnavailable(format!(
                    "failed to load artifact from {}: {e}",
                    path.display()
                ))
            })?;

        // Discover input/output names from session metadata
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            input = %input_name,
            output = %output_name,
            "Risk model loaded"
        );

        Ok(LoadedArtifact {
            session,
            input_name,
            output_name,
        })
    }
}
