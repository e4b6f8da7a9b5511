//! Risk assessment output types

use crate::error::{PipelineError, Result};
use crate::types::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lower bound of the medium risk band.
pub const MEDIUM_THRESHOLD: f64 = 0.3;
/// Lower bound of the high risk band.
pub const HIGH_THRESHOLD: f64 = 0.7;

/// Discrete risk category for a scored transaction.
///
/// Closed enumeration: a probability always lands in exactly one band, and
/// out-of-range input is rejected before construction, so there is no
/// "unknown" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Categorize a fraud probability.
    ///
    /// `p < 0.3` is low, `0.3 <= p < 0.7` is medium, `p >= 0.7` is high;
    /// both boundaries belong to the higher band. NaN or values outside
    /// [0, 1] fail with [`PipelineError::InvalidScore`]: the model should
    /// never emit them, but the categorizer does not trust that blindly.
    pub fn try_from_score(score: f64) -> Result<Self> {
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(PipelineError::InvalidScore(score));
        }
        if score >= HIGH_THRESHOLD {
            Ok(RiskLevel::High)
        } else if score >= MEDIUM_THRESHOLD {
            Ok(RiskLevel::Medium)
        } else {
            Ok(RiskLevel::Low)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Per-transaction scoring result, computed fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub transaction_id: String,
    pub wallet_id: String,
    pub method: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    /// Fraud probability in [0, 1], rounded to 4 decimal places
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    /// Build an assessment from the transaction it scores.
    pub fn new(transaction: &Transaction, risk_score: f64, risk_level: RiskLevel) -> Self {
        Self {
            transaction_id: transaction.transaction_id.clone(),
            wallet_id: transaction.wallet_id.clone(),
            method: transaction.method.clone(),
            amount: transaction.amount,
            timestamp: transaction.timestamp,
            risk_score: (risk_score * 10_000.0).round() / 10_000.0,
            risk_level,
        }
    }
}

/// Aggregate statistics over one analysis request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    /// Number of assessments produced
    pub total: u64,
    /// Assessments per risk level
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    /// Mean risk score across produced assessments; 0.0 when there are none
    pub mean_risk_score: f64,
    /// Records dropped by the per-record skip policy
    pub skipped: u64,
}

impl WalletSummary {
    /// Aggregate counts and mean score from produced assessments.
    pub fn from_assessments(assessments: &[RiskAssessment], skipped: u64) -> Self {
        let mut summary = WalletSummary {
            total: assessments.len() as u64,
            skipped,
            ..Default::default()
        };

        let mut score_sum = 0.0;
        for assessment in assessments {
            match assessment.risk_level {
                RiskLevel::Low => summary.low += 1,
                RiskLevel::Medium => summary.medium += 1,
                RiskLevel::High => summary.high += 1,
            }
            score_sum += assessment.risk_score;
        }

        if !assessments.is_empty() {
            summary.mean_risk_score = score_sum / assessments.len() as f64;
        }
        summary
    }
}

/// Response payload for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub assessments: Vec<RiskAssessment>,
    pub summary: WalletSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bands() {
        assert_eq!(RiskLevel::try_from_score(0.0).unwrap(), RiskLevel::Low);
        assert_eq!(RiskLevel::try_from_score(0.29999).unwrap(), RiskLevel::Low);
        assert_eq!(RiskLevel::try_from_score(0.5).unwrap(), RiskLevel::Medium);
        assert_eq!(RiskLevel::try_from_score(0.69999).unwrap(), RiskLevel::Medium);
        assert_eq!(RiskLevel::try_from_score(0.95).unwrap(), RiskLevel::High);
        assert_eq!(RiskLevel::try_from_score(1.0).unwrap(), RiskLevel::High);
    }

    #[test]
    fn test_boundaries_belong_to_higher_band() {
        assert_eq!(RiskLevel::try_from_score(0.3).unwrap(), RiskLevel::Medium);
        assert_eq!(RiskLevel::try_from_score(0.7).unwrap(), RiskLevel::High);
    }

    #[test]
    fn test_out_of_range_scores_rejected() {
        assert!(matches!(
            RiskLevel::try_from_score(-0.1),
            Err(PipelineError::InvalidScore(_))
        ));
        assert!(matches!(
            RiskLevel::try_from_score(1.1),
            Err(PipelineError::InvalidScore(_))
        ));
        assert!(matches!(
            RiskLevel::try_from_score(f64::NAN),
            Err(PipelineError::InvalidScore(_))
        ));
    }

    #[test]
    fn test_risk_level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_assessment_rounds_score() {
        let tx = Transaction::new(
            "tx_1",
            "0x742d35cc6634c0532925a3b8d5c9c89d05afe3b2",
            "transfer",
            10.0,
            0.001,
            Utc::now(),
        );
        let assessment = RiskAssessment::new(&tx, 0.123456, RiskLevel::Low);
        assert_eq!(assessment.risk_score, 0.1235);
    }

    #[test]
    fn test_assessment_payload_field_names() {
        let tx = Transaction::new(
            "tx_1",
            "0x742d35cc6634c0532925a3b8d5c9c89d05afe3b2",
            "swap",
            42.0,
            0.002,
            Utc::now(),
        );
        let assessment = RiskAssessment::new(&tx, 0.8, RiskLevel::High);
        let value: serde_json::Value = serde_json::to_value(&assessment).unwrap();

        assert_eq!(value["transaction_id"], "tx_1");
        assert_eq!(value["wallet_id"], tx.wallet_id);
        assert_eq!(value["method"], "swap");
        assert_eq!(value["amount"], 42.0);
        assert_eq!(value["risk_score"], 0.8);
        assert_eq!(value["risk_level"], "high");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_summary_aggregation() {
        let tx = Transaction::new(
            "tx_1",
            "0x742d35cc6634c0532925a3b8d5c9c89d05afe3b2",
            "transfer",
            10.0,
            0.001,
            Utc::now(),
        );
        let assessments = vec![
            RiskAssessment::new(&tx, 0.95, RiskLevel::High),
            RiskAssessment::new(&tx, 0.5, RiskLevel::Medium),
            RiskAssessment::new(&tx, 0.1, RiskLevel::Low),
        ];

        let summary = WalletSummary::from_assessments(&assessments, 0);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.low, 1);
        assert!((summary.mean_risk_score - 0.51666).abs() < 1e-4);
    }

    #[test]
    fn test_empty_summary_has_zero_mean() {
        let summary = WalletSummary::from_assessments(&[], 0);
        assert_eq!(summary, WalletSummary::default());
        assert_eq!(summary.mean_risk_score, 0.0);
    }
}
