use anyhow::{Context, Result};
use portval_core::PortfolioEngine;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::dataset;

/// Installs the global subscriber. Logs go to stderr so stdout stays valid JSON.
pub fn init_tracing() {
    let log_format = std::env::var("PORTVAL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Loads the configured dataset directory and replays its transactions.
pub fn build_engine(config: &Config) -> Result<PortfolioEngine> {
    let files = dataset::load_dir(&config.data_dir)
        .with_context(|| format!("Failed to read dataset in {}", config.data_dir.display()))?;
    let engine = PortfolioEngine::new(config.engine_settings())?;

    let report = engine
        .load_dataset(files.dataset)
        .context("Failed to load dataset")?;
    tracing::info!(
        "Loaded {} portfolios, {} holdings and {} prices from {} ({} price rows skipped)",
        report.portfolios_created,
        report.holdings_initialized,
        report.prices.inserted + report.prices.overwritten,
        config.data_dir.display(),
        report.prices_skipped()
    );

    for (index, request) in files.transactions.iter().enumerate() {
        engine.process_transaction(request).with_context(|| {
            format!(
                "Transaction {} of {} ({} {} -> {} on {}) was rejected",
                index + 1,
                dataset::TRANSACTIONS_FILE,
                request.portfolio,
                request.sell_asset,
                request.buy_asset,
                request.date
            )
        })?;
    }
    if !files.transactions.is_empty() {
        tracing::info!("Replayed {} transactions", files.transactions.len());
    }
    Ok(engine)
}
