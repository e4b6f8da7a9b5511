//! Transaction store access
//!
//! The store is an external collaborator: raw transaction records are
//! written by the ingestion process and read-only here.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::error::Result;
use crate::types::transaction::Transaction;
use async_trait::async_trait;

/// Read-only query interface over ingested transactions.
///
/// Both operations return an empty vec, never an error, when nothing
/// matches. Ordering of returned records is unspecified; callers must not
/// assume it is chronological.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Fetch every transaction in the store.
    async fn fetch_all(&self) -> Result<Vec<Transaction>>;

    /// Fetch the transactions belonging to one wallet.
    async fn fetch_by_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>>;
}
