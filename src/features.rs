//! Feature extraction for fraud risk model inference.
//!
//! Transforms one raw transaction, plus wallet-level context, into the
//! fixed-order numeric vector the classifier was trained on.

use crate::error::{PipelineError, Result};
use crate::types::transaction::Transaction;
use chrono::{DateTime, Utc};

/// Number of features the trained model expects.
pub const FEATURE_COUNT: usize = 5;

/// Reserved code for methods outside the trained vocabulary.
///
/// Part of the trained feature contract: unknown methods are a legitimate
/// input, not an error.
pub const UNKNOWN_METHOD_CODE: i64 = -1;

/// Sentinel for `time_since_last_transaction` when the wallet has no prior
/// transaction. Real elapsed values are clamped to `>= 0` and a legitimate
/// immediate repeat yields `0.0`, so `-1.0` cannot collide with observed
/// data.
pub const NO_PRIOR_TRANSACTION_HOURS: f64 = -1.0;

/// Deterministic numeric encoding of the transaction method vocabulary.
///
/// The codes match the mapping used at training time; lookup is
/// case-insensitive.
pub fn method_code(method: &str) -> i64 {
    match method.to_ascii_lowercase().as_str() {
        "transfer" => 0,
        "swap" => 1,
        "stake" => 2,
        "deposit" => 3,
        "withdraw" => 4,
        "mint" => 5,
        "burn" => 6,
        "approve" => 7,
        "trade" => 8,
        "lend" => 9,
        "borrow" => 10,
        "farm" => 11,
        "bridge" => 12,
        "auction" => 13,
        "vote" => 14,
        _ => UNKNOWN_METHOD_CODE,
    }
}

/// Per-wallet state needed to compute time-based features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletContext {
    /// Timestamp of the wallet's previous transaction, if any
    pub previous_timestamp: Option<DateTime<Utc>>,
}

impl WalletContext {
    pub fn new(previous_timestamp: Option<DateTime<Utc>>) -> Self {
        Self { previous_timestamp }
    }
}

/// Fixed-order numeric representation of one transaction.
///
/// Field order and length must exactly match what the model was trained on;
/// [`FeatureVector::to_array`] is the only conversion to model input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub amount: f64,
    pub gas_fee: f64,
    pub time_since_last_transaction: f64,
    pub transaction_frequency: f64,
    pub method_numeric: f64,
}

impl FeatureVector {
    /// Flatten into the model input layout.
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.amount as f32,
            self.gas_fee as f32,
            self.time_since_last_transaction as f32,
            self.transaction_frequency as f32,
            self.method_numeric as f32,
        ]
    }

    /// Feature names in model input order.
    pub fn feature_names() -> [&'static str; FEATURE_COUNT] {
        [
            "amount",
            "gas_fee",
            "time_since_last_transaction",
            "transaction_frequency",
            "method_numeric",
        ]
    }
}

/// Extracts the model feature vector from a transaction.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from one transaction given its wallet context.
    ///
    /// Pure function of its inputs. Fails with
    /// [`PipelineError::InvalidTransaction`] when the record is semantically
    /// malformed; negative amounts are surfaced, never coerced.
    pub fn extract(&self, tx: &Transaction, context: &WalletContext) -> Result<FeatureVector> {
        if let Some(reason) = tx.validate() {
            return Err(PipelineError::InvalidTransaction {
                transaction_id: tx.transaction_id.clone(),
                reason,
            });
        }

        let time_since_last_transaction = match context.previous_timestamp {
            Some(previous) => {
                // Clock skew between ingested records can produce a negative
                // delta; clamp to zero like the training pipeline did.
                let hours = (tx.timestamp - previous).num_seconds() as f64 / 3600.0;
                hours.max(0.0)
            }
            None => NO_PRIOR_TRANSACTION_HOURS,
        };

        Ok(FeatureVector {
            amount: tx.amount,
            gas_fee: tx.gas_fee,
            time_since_last_transaction,
            transaction_frequency: tx.frequency as f64,
            method_numeric: method_code(&tx.method) as f64,
        })
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
