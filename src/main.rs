use transfer_engine::config::AppConfig;
use transfer_engine::dispatch::{self, AppState, StatusCodes};
use transfer_engine::ledger::TransferEngine;
use transfer_engine::logging::init_logging;
use transfer_engine::repository::CsvRepository;

use anyhow::Context;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config);

    let repository = Arc::new(CsvRepository::new(
        &config.ledger.source,
        config.ledger.destination(),
    ));
    let destination = repository.destination().display().to_string();
    let engine = TransferEngine::load(repository)
        .with_context(|| format!("failed to load ledger from {}", config.ledger.source.display()))?
        .with_blacklist(config.blacklist.iter().cloned());
    let state = AppState::new(
        Arc::new(engine),
        StatusCodes::from_legacy_flag(config.legacy_status_codes),
    );

    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(
        %address,
        %destination,
        legacy_status_codes = config.legacy_status_codes,
        "listening"
    );

    axum::serve(listener, dispatch::router(state)).await?;

    Ok(())
}
