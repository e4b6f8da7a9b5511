//! Raw blockchain transaction records as ingested into the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blockchain transaction associated with a wallet.
///
/// Created by the external ingestion process and read-only to the scoring
/// pipeline. `frequency` is the count of prior transactions for the wallet
/// at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (the store's `_id`)
    #[serde(alias = "_id")]
    pub transaction_id: String,

    /// Address-formatted wallet identifier this transaction belongs to
    pub wallet_id: String,

    /// Transaction method (transfer, swap, stake, ...), lowercase
    pub method: String,

    /// Transferred amount
    pub amount: f64,

    /// Gas fee paid
    pub gas_fee: f64,

    /// When the transaction was included
    pub timestamp: DateTime<Utc>,

    /// Recipient address
    #[serde(default)]
    pub to_address: String,

    /// Sender address
    #[serde(default)]
    pub from_address: String,

    /// Block the transaction was included in
    #[serde(default)]
    pub block_number: u64,

    /// Position within the block
    #[serde(default)]
    pub transaction_index: u32,

    /// Count of prior transactions for the wallet at ingestion time
    #[serde(default)]
    pub frequency: u32,
}

impl Transaction {
    /// Create a transaction with the fields the scorer depends on.
    pub fn new(
        transaction_id: impl Into<String>,
        wallet_id: impl Into<String>,
        method: impl Into<String>,
        amount: f64,
        gas_fee: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            wallet_id: wallet_id.into(),
            method: method.into(),
            amount,
            gas_fee,
            timestamp,
            to_address: String::new(),
            from_address: String::new(),
            block_number: 0,
            transaction_index: 0,
            frequency: 0,
        }
    }

    /// Semantic validation of an ingested record.
    ///
    /// Returns the reason the record is unusable for scoring, if any.
    /// Unknown methods are not a defect here; they map to the reserved
    /// fallback feature code.
    pub fn validate(&self) -> Option<String> {
        if self.transaction_id.is_empty() {
            return Some("missing transaction id".to_string());
        }
        if self.wallet_id.is_empty() {
            return Some("missing wallet id".to_string());
        }
        if !self.amount.is_finite() {
            return Some(format!("non-finite amount {}", self.amount));
        }
        if self.amount < 0.0 {
            return Some(format!("negative amount {}", self.amount));
        }
        if !self.gas_fee.is_finite() {
            return Some(format!("non-finite gas fee {}", self.gas_fee));
        }
        if self.gas_fee < 0.0 {
            return Some(format!("negative gas fee {}", self.gas_fee));
        }
        None
    }
}
