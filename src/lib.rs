//! Wallet Risk Scoring Pipeline
//!
//! Assigns a fraud-risk score and category to blockchain transactions
//! associated with a wallet: fetch from the transaction store, extract a
//! fixed-order feature vector per transaction, evaluate a pre-trained
//! classifier, and map each probability to a discrete risk level with
//! aggregate statistics.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod store;
pub mod types;

pub use analyzer::WalletAnalyzer;
pub use config::AppConfig;
pub use error::PipelineError;
pub use features::FeatureExtractor;
pub use model::{OnnxRiskModel, RiskModel};
pub use store::{MongoStore, TransactionStore};
pub use types::{AnalysisReport, RiskAssessment, RiskLevel, Transaction, WalletSummary};
