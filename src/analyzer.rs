//! Wallet analysis orchestrator
//!
//! Coordinates fetch -> extract -> score -> categorize -> aggregate for one
//! analysis request.

use crate::error::{PipelineError, Result};
use crate::features::{FeatureExtractor, WalletContext};
use crate::model::RiskModel;
use crate::store::TransactionStore;
use crate::types::assessment::{AnalysisReport, RiskAssessment, RiskLevel, WalletSummary};
use crate::types::transaction::Transaction;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Validate a wallet identifier: `0x` followed by exactly 40 hex characters.
///
/// Fails fast with [`PipelineError::InvalidWalletId`] before any store
/// access.
pub fn validate_wallet_id(wallet_id: &str) -> Result<()> {
    let hex_part = wallet_id
        .strip_prefix("0x")
        .ok_or_else(|| PipelineError::InvalidWalletId(wallet_id.to_string()))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PipelineError::InvalidWalletId(wallet_id.to_string()));
    }
    Ok(())
}

/// Orchestrates one wallet analysis request end-to-end.
///
/// Owns no persistent state; the model handle is process-wide immutable
/// state injected at construction, and all derived objects live only for
/// the duration of one request.
pub struct WalletAnalyzer {
    store: Arc<dyn TransactionStore>,
    model: Arc<dyn RiskModel>,
    extractor: FeatureExtractor,
}

impl WalletAnalyzer {
    pub fn new(store: Arc<dyn TransactionStore>, model: Arc<dyn RiskModel>) -> Self {
        Self {
            store,
            model,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Analyze one wallet, or every wallet when `wallet_id` is absent or
    /// empty.
    ///
    /// Per-record extraction/scoring failures are skipped and counted in
    /// the summary; store failures abort and propagate.
    pub async fn analyze(&self, wallet_id: Option<&str>) -> Result<AnalysisReport> {
        let transactions = match wallet_id {
            Some(id) if !id.is_empty() => {
                validate_wallet_id(id)?;
                self.store.fetch_by_wallet(id).await?
            }
            _ => self.store.fetch_all().await?,
        };

        info!(
            wallet_id = wallet_id.unwrap_or("<all>"),
            count = transactions.len(),
            "Retrieved transactions for analysis"
        );

        // Store ordering is unspecified, so the per-wallet cursor is
        // computed from an explicit sort-by-timestamp pass before scoring.
        let previous = previous_timestamps(&transactions);

        let mut assessments = Vec::with_capacity(transactions.len());
        let mut skipped: u64 = 0;

        for (idx, tx) in transactions.iter().enumerate() {
            let context = WalletContext::new(previous[idx]);

            match self.assess(tx, &context) {
                Ok(assessment) => assessments.push(assessment),
                Err(e) if e.is_per_record() => {
                    skipped += 1;
                    if e.is_contract_anomaly() {
                        error!(
                            transaction_id = %tx.transaction_id,
                            error = %e,
                            "Model/feature contract violation, skipping record"
                        );
                    } else {
                        warn!(
                            transaction_id = %tx.transaction_id,
                            error = %e,
                            "Skipping malformed transaction"
                        );
                    }
                }
                Err(e) => return Err(e),
            }
        }

        // Highest risk first, for dashboard display
        assessments.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let summary = WalletSummary::from_assessments(&assessments, skipped);

        info!(
            assessed = summary.total,
            skipped = summary.skipped,
            mean_risk_score = summary.mean_risk_score,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            assessments,
            summary,
        })
    }

    /// Score one transaction: extract -> score -> categorize.
    fn assess(&self, tx: &Transaction, context: &WalletContext) -> Result<RiskAssessment> {
        let vector = self.extractor.extract(tx, context)?;
        let score = self.model.score(&vector.to_array())?;
        let level = RiskLevel::try_from_score(score)?;
        Ok(RiskAssessment::new(tx, score, level))
    }
}

/// For each transaction, the timestamp of the same wallet's previous
/// transaction, aligned to store arrival order.
///
/// Cursors are tracked independently per wallet, so a global query never
/// leaks one wallet's timing into another's features.
fn previous_timestamps(transactions: &[Transaction]) -> Vec<Option<DateTime<Utc>>> {
    let mut by_wallet: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, tx) in transactions.iter().enumerate() {
        by_wallet.entry(tx.wallet_id.as_str()).or_default().push(idx);
    }

    let mut previous = vec![None; transactions.len()];
    for indices in by_wallet.values() {
        let mut chronological = indices.clone();
        chronological.sort_by_key(|&idx| transactions[idx].timestamp);
        for pair in chronological.windows(2) {
            previous[pair[1]] = Some(transactions[pair[0]].timestamp);
        }
    }
    previous
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FEATURE_COUNT, NO_PRIOR_TRANSACTION_HOURS};
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    const WALLET_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const WALLET_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    /// Stub model: returns the amount feature as the probability, so test
    /// transactions can pin exact scores.
    struct AmountModel;

    impl RiskModel for AmountModel {
        fn feature_count(&self) -> usize {
            FEATURE_COUNT
        }

        fn score(&self, features: &[f32]) -> Result<f64> {
            if features.len() != FEATURE_COUNT {
                return Err(PipelineError::FeatureShape {
                    expected: FEATURE_COUNT,
                    actual: features.len(),
                });
            }
            Ok(features[0] as f64)
        }
    }

    /// Stub model that records the elapsed-time feature it saw per call.
    struct ElapsedCapture(std::sync::Mutex<Vec<f32>>);

    impl RiskModel for ElapsedCapture {
        fn feature_count(&self) -> usize {
            FEATURE_COUNT
        }

        fn score(&self, features: &[f32]) -> Result<f64> {
            self.0.lock().unwrap().push(features[2]);
            Ok(0.5)
        }
    }

    fn tx_at(id: &str, wallet: &str, amount: f64, hour: u32) -> Transaction {
        Transaction::new(
            id,
            wallet,
            "transfer",
            amount,
            0.001,
            Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
        )
    }

    fn analyzer_with(
        transactions: Vec<Transaction>,
    ) -> (WalletAnalyzer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(transactions));
        let analyzer = WalletAnalyzer::new(store.clone(), Arc::new(AmountModel));
        (analyzer, store)
    }

    #[test]
    fn test_wallet_id_validation() {
        assert!(validate_wallet_id(WALLET_A).is_ok());
        assert!(validate_wallet_id("0x742d35Cc6634C0532925a3b8D5C9C89D05afe3b2").is_ok());

        for bad in [
            "not-a-wallet",
            "0x123",
            // 42 characters but not hex after the marker
            "0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz",
            "742d35cc6634c0532925a3b8d5c9c89d05afe3b2",
            "0x742d35cc6634c0532925a3b8d5c9c89d05afe3b2ff",
        ] {
            assert!(
                matches!(
                    validate_wallet_id(bad),
                    Err(PipelineError::InvalidWalletId(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_wallet_rejected_before_store_access() {
        let (analyzer, store) = analyzer_with(vec![tx_at("tx_1", WALLET_A, 0.5, 10)]);

        let err = analyzer.analyze(Some("not-a-wallet")).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWalletId(_)));
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_wallet_returns_zero_summary() {
        let (analyzer, _) = analyzer_with(vec![tx_at("tx_1", WALLET_B, 0.5, 10)]);

        let report = analyzer.analyze(Some(WALLET_A)).await.unwrap();
        assert!(report.assessments.is_empty());
        assert_eq!(report.summary, WalletSummary::default());
    }

    #[tokio::test]
    async fn test_absent_and_empty_wallet_id_are_equivalent() {
        let transactions = vec![
            tx_at("tx_1", WALLET_A, 0.2, 10),
            tx_at("tx_2", WALLET_B, 0.4, 11),
        ];
        let (analyzer, _) = analyzer_with(transactions);

        let global = analyzer.analyze(None).await.unwrap();
        let empty = analyzer.analyze(Some("")).await.unwrap();

        assert_eq!(global.assessments.len(), 2);
        assert_eq!(global.summary, empty.summary);
    }

    #[tokio::test]
    async fn test_three_transaction_scenario() {
        let transactions = vec![
            tx_at("tx_high", WALLET_A, 0.95, 10),
            tx_at("tx_med", WALLET_A, 0.5, 11),
            tx_at("tx_low", WALLET_A, 0.1, 12),
        ];
        let (analyzer, _) = analyzer_with(transactions);

        let report = analyzer.analyze(Some(WALLET_A)).await.unwrap();

        let level_of = |id: &str| {
            report
                .assessments
                .iter()
                .find(|a| a.transaction_id == id)
                .unwrap()
                .risk_level
        };
        assert_eq!(level_of("tx_high"), RiskLevel::High);
        assert_eq!(level_of("tx_med"), RiskLevel::Medium);
        assert_eq!(level_of("tx_low"), RiskLevel::Low);

        let summary = &report.summary;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.skipped, 0);
        assert!((summary.mean_risk_score - 0.51666).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_corrupt_transaction_is_skipped_not_fatal() {
        let mut corrupt = tx_at("tx_bad", WALLET_A, 0.5, 11);
        corrupt.amount = -50.0;

        let transactions = vec![
            tx_at("tx_1", WALLET_A, 0.2, 10),
            corrupt,
            tx_at("tx_2", WALLET_A, 0.8, 12),
        ];
        let (analyzer, _) = analyzer_with(transactions);

        let report = analyzer.analyze(Some(WALLET_A)).await.unwrap();
        assert_eq!(report.assessments.len(), 2);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.skipped, 1);
        assert!(report
            .assessments
            .iter()
            .all(|a| a.transaction_id != "tx_bad"));
    }

    #[tokio::test]
    async fn test_assessments_sorted_by_descending_score() {
        let transactions = vec![
            tx_at("tx_low", WALLET_A, 0.1, 10),
            tx_at("tx_high", WALLET_A, 0.9, 11),
            tx_at("tx_med", WALLET_A, 0.5, 12),
        ];
        let (analyzer, _) = analyzer_with(transactions);

        let report = analyzer.analyze(Some(WALLET_A)).await.unwrap();
        let ids: Vec<&str> = report
            .assessments
            .iter()
            .map(|a| a.transaction_id.as_str())
            .collect();
        assert_eq!(ids, ["tx_high", "tx_med", "tx_low"]);
    }

    #[tokio::test]
    async fn test_cursor_is_per_wallet_and_sorted_by_timestamp() {
        // Arrival order is deliberately non-chronological and interleaved
        // across wallets.
        let transactions = vec![
            tx_at("a_late", WALLET_A, 0.5, 12),
            tx_at("b_only", WALLET_B, 0.5, 11),
            tx_at("a_early", WALLET_A, 0.5, 10),
        ];
        let capture = Arc::new(ElapsedCapture(std::sync::Mutex::new(Vec::new())));
        let store = Arc::new(MemoryStore::new(transactions));
        let analyzer = WalletAnalyzer::new(store, capture.clone());

        analyzer.analyze(None).await.unwrap();

        let elapsed = capture.0.lock().unwrap().clone();
        // a_late follows a_early by 2 hours; b_only and a_early have no
        // prior transaction in their wallets.
        assert_eq!(elapsed[0], 2.0);
        assert_eq!(elapsed[1], NO_PRIOR_TRANSACTION_HOURS as f32);
        assert_eq!(elapsed[2], NO_PRIOR_TRANSACTION_HOURS as f32);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_counted_as_skip() {
        struct BrokenModel;
        impl RiskModel for BrokenModel {
            fn feature_count(&self) -> usize {
                FEATURE_COUNT
            }
            fn score(&self, _features: &[f32]) -> Result<f64> {
                Ok(1.5)
            }
        }

        let store = Arc::new(MemoryStore::new(vec![tx_at("tx_1", WALLET_A, 0.5, 10)]));
        let analyzer = WalletAnalyzer::new(store, Arc::new(BrokenModel));

        let report = analyzer.analyze(Some(WALLET_A)).await.unwrap();
        assert!(report.assessments.is_empty());
        assert_eq!(report.summary.skipped, 1);
    }
}
