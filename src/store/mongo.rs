//! MongoDB-backed transaction store

use crate::error::Result;
use crate::store::TransactionStore;
use crate::types::transaction::Transaction;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::ClientOptions,
    Client, Collection,
};
use tracing::{debug, info};

/// Transaction store reading from a MongoDB collection.
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<Transaction>,
}

impl MongoStore {
    /// Connect to MongoDB and bind to the transaction collection.
    ///
    /// Pings the server before use so a dead store surfaces at startup
    /// rather than on the first request.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;

        info!(database = %database, collection = %collection, "Connected to MongoDB");

        let collection = client.database(database).collection::<Transaction>(collection);
        Ok(Self { collection })
    }
}

#[async_trait]
impl TransactionStore for MongoStore {
    async fn fetch_all(&self) -> Result<Vec<Transaction>> {
        let cursor = self.collection.find(None, None).await?;
        let transactions: Vec<Transaction> = cursor.try_collect().await?;
        debug!(count = transactions.len(), "Fetched all transactions");
        Ok(transactions)
    }

    async fn fetch_by_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        let filter = doc! { "wallet_id": wallet_id };
        let cursor = self.collection.find(filter, None).await?;
        let transactions: Vec<Transaction> = cursor.try_collect().await?;
        debug!(
            wallet_id = %wallet_id,
            count = transactions.len(),
            "Fetched wallet transactions"
        );
        Ok(transactions)
    }
}
