//! In-memory transaction store for tests and local development

use crate::error::Result;
use crate::store::TransactionStore;
use crate::types::transaction::Transaction;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Seeded in-memory store that counts fetches.
///
/// The fetch counter lets tests verify that malformed queries are rejected
/// before any store access happens.
#[derive(Default)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
    fetches: AtomicU64,
}

impl MemoryStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            fetches: AtomicU64::new(0),
        }
    }

    /// Total number of fetch calls served so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Transaction>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.transactions.clone())
    }

    async fn fetch_by_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .transactions
            .iter()
            .filter(|tx| tx.wallet_id == wallet_id)
            .cloned()
            .collect())
    }
}
