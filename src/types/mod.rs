//! Type definitions for the wallet risk scoring pipeline

pub mod assessment;
pub mod transaction;

pub use assessment::{AnalysisReport, RiskAssessment, RiskLevel, WalletSummary};
pub use transaction::Transaction;
