use std::{env, fs::File, io, path::Path, sync::Arc};

use tracing::info;
use tracing_subscriber::EnvFilter;

use account_ledger::{
    LedgerConfig, MemoryStore, dlq::StdErrDLQ, engine::Engine, events::TracingPublisher,
    ingestion::CsvReader,
};

#[tokio::main] // using Tokio runtime for async
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays a clean CSV report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mut args = env::args();
    let file_path = args
        .nth(1)
        .ok_or("usage: account_ledger <commands.csv>")?;
    let file = File::open(Path::new(&file_path))?;

    let config = LedgerConfig::from_env()?;

    // Set up the components
    let mut engine = Engine::new(
        CsvReader::new(file),
        Arc::new(MemoryStore::new()),
        Arc::new(TracingPublisher::default()),
        config,
        StdErrDLQ::default(),
    );

    let summary = engine.process().await?;
    info!(applied = summary.applied, rejected = summary.rejected, "commands processed");

    engine.flush(io::stdout().lock()).await?;

    Ok(())
}
