//! Error taxonomy for the wallet risk scoring pipeline

use thiserror::Error;

/// Errors produced by the scoring pipeline.
///
/// Per-record kinds (`InvalidTransaction`, `FeatureShape`, `InvalidScore`,
/// `Inference`) are isolated by the orchestrator's skip-and-count policy;
/// everything else propagates to the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed wallet identifier, rejected before any store access.
    #[error("invalid wallet id {0:?}: expected a 0x-prefixed 40-character hex address")]
    InvalidWalletId(String),

    /// Malformed transaction record; that single record is skipped.
    #[error("invalid transaction {transaction_id}: {reason}")]
    InvalidTransaction {
        transaction_id: String,
        reason: String,
    },

    /// Feature vector does not match the trained model's input shape.
    #[error("feature shape mismatch: model expects {expected} features, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    /// Model emitted a probability outside [0, 1].
    #[error("risk score {0} is outside [0, 1]")]
    InvalidScore(f64),

    /// Model artifact could not be loaded; fatal at startup.
    #[error("risk model unavailable: {0}")]
    ModelUnavailable(String),

    /// Request-time inference failure for a single record.
    #[error("model inference failed: {0}")]
    Inference(String),

    /// Transaction store failure; surfaced to the caller, never retried here.
    #[error("transaction store error: {0}")]
    Store(#[from] mongodb::error::Error),
}

impl PipelineError {
    /// Whether the orchestrator may skip the offending record and continue.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidTransaction { .. }
                | PipelineError::FeatureShape { .. }
                | PipelineError::InvalidScore(_)
                | PipelineError::Inference(_)
        )
    }

    /// Whether this kind indicates a model/feature contract bug rather than
    /// bad input data.
    pub fn is_contract_anomaly(&self) -> bool {
        matches!(
            self,
            PipelineError::FeatureShape { .. }
                | PipelineError::InvalidScore(_)
                | PipelineError::Inference(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_record_classification() {
        let err = PipelineError::InvalidTransaction {
            transaction_id: "tx_1".to_string(),
            reason: "negative amount".to_string(),
        };
        assert!(err.is_per_record());
        assert!(!err.is_contract_anomaly());

        let err = PipelineError::FeatureShape {
            expected: 5,
            actual: 4,
        };
        assert!(err.is_per_record());
        assert!(err.is_contract_anomaly());

        assert!(!PipelineError::InvalidWalletId("0x123".to_string()).is_per_record());
        assert!(!PipelineError::ModelUnavailable("missing file".to_string()).is_per_record());
    }

    #[test]
    fn test_error_messages_name_the_input() {
        let err = PipelineError::InvalidWalletId("not-a-wallet".to_string());
        assert!(err.to_string().contains("not-a-wallet"));

        let err = PipelineError::InvalidScore(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
