use clap::Parser;
use fundme::application::engine::Ledger;
use fundme::config::AppConfig;
use fundme::domain::call::CallContext;
use fundme::domain::ports::{LedgerStoreBox, ValueTransferBox};
use fundme::infrastructure::in_memory::{InMemoryBank, InMemoryLedgerStore};
#[cfg(feature = "storage-rocksdb")]
use fundme::infrastructure::rocksdb::RocksDBStore;
use fundme::interfaces::csv::call_reader::CallReader;
use fundme::interfaces::csv::report_writer::ReportWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input calls CSV file (call, caller, value)
    input: PathBuf,

    /// Deployment configuration (TOML). Defaults to a local development chain.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chain to deploy on. Defaults to the configured default chain.
    #[arg(long)]
    chain_id: Option<u64>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryLedgerStore::new()))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path).into_diagnostic()?,
        None => AppConfig::default(),
    };
    let chain_id = cli.chain_id.unwrap_or(config.default_chain);
    if config.is_development(chain_id) {
        info!(chain_id, "Development chain detected, deploying mock price feed");
    }
    let price_feed = config.price_feed(chain_id).into_diagnostic()?;

    let store = open_store(cli.db_path)?;
    let bank = InMemoryBank::new();
    let transfer: ValueTransferBox = Box::new(bank.clone());

    let deployer = CallContext::from_sender(config.deployer.clone());
    let ledger = Ledger::deploy(&deployer, price_feed, store, transfer)
        .await
        .into_diagnostic()?;

    // Replay calls
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CallReader::new(file);
    for (line, call_result) in reader.calls().enumerate() {
        match call_result {
            Ok(call) => {
                if let Err(e) = ledger.execute(call.call, &call.context()).await {
                    warn!("Error processing call {}: {}", line + 1, e);
                }
            }
            Err(e) => {
                warn!("Error reading call {}: {}", line + 1, e);
            }
        }
    }

    let state = ledger.snapshot().await.into_diagnostic()?;
    info!(
        owner = %ledger.owner(),
        balance = %state.balance,
        paid_out = %bank.balance_of(ledger.owner()).await,
        "Replay finished"
    );

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(&state).into_diagnostic()?;

    Ok(())
}
