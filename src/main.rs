//! Wallet Risk Scoring Pipeline - Main Entry Point
//!
//! Loads the trained classifier, connects to the transaction store, and
//! runs one analysis request (global or per-wallet), printing the report
//! as JSON for the dashboard boundary.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wallet_risk_pipeline::{AppConfig, MongoStore, OnnxRiskModel, WalletAnalyzer};

#[derive(Parser, Debug)]
#[command(name = "wallet-risk-pipeline", about = "Score wallet transactions for fraud risk")]
struct Args {
    /// Wallet address to analyze (0x-prefixed 40-char hex); omit to analyze
    /// all transactions
    #[arg(long)]
    wallet: Option<String>,

    /// Path to the configuration file
    #[arg(long, default_value = "config/config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wallet_risk_pipeline=info".parse()?),
        )
        .init();

    info!("Starting wallet risk scoring pipeline");

    let config = AppConfig::load_from_path(&args.config)?;
    info!(config = %args.config.display(), "Configuration loaded");

    // Model loading failure is fatal to startup, never recovered per request
    let model = Arc::new(OnnxRiskModel::load(
        &config.model.path,
        config.model.onnx_threads,
    )?);
    info!(path = %config.model.path, "Risk model loaded");

    let store = Arc::new(
        MongoStore::connect(
            &config.store.uri,
            &config.store.database,
            &config.store.collection,
        )
        .await?,
    );

    let analyzer = WalletAnalyzer::new(store, model);
    let report = analyzer.analyze(args.wallet.as_deref()).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
