//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// Portval - portfolio valuation over a CSV dataset
#[derive(Parser)]
#[command(name = "portval")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Dataset directory (overrides PORTVAL_DATA_DIR)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Amounts, weights and total value per date
    Value(RangeArgs),

    /// Weights per date
    Weights(RangeArgs),

    /// Quantities held on a date
    Holdings(HoldingsArgs),

    /// Sell one asset and buy another for the same dollar amount
    Transact(TransactArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Portfolio name
    pub portfolio: String,

    /// First date (defaults to the portfolio's inception)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date (defaults to the latest price of the portfolio's assets)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct HoldingsArgs {
    /// Portfolio name
    pub portfolio: String,

    /// Valuation date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
}

#[derive(Args, Debug, Clone)]
pub struct TransactArgs {
    /// Portfolio name
    pub portfolio: String,

    /// Asset to sell
    #[arg(long)]
    pub sell: String,

    /// Asset to buy
    #[arg(long)]
    pub buy: String,

    /// Execution date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Dollar amount moved between the two assets
    #[arg(long)]
    pub amount: Decimal,
}
