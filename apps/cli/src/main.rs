//! Portval CLI - portfolio valuation over a CSV dataset directory.
//!
//! # Usage
//!
//! ```bash
//! # Value a portfolio from inception to its latest price
//! portval --data-dir ./data value "Portfolio 1"
//!
//! # Weights over a range
//! portval weights "Portfolio 1" --start 2022-05-01 --end 2022-05-31
//!
//! # Quantities on a date
//! portval holdings "Portfolio 1" --date 2022-05-16
//!
//! # Move $200,000,000 from EEUU to Europa
//! portval transact "Portfolio 1" --sell EEUU --buy Europa --date 2022-05-15 --amount 200000000
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod dataset;
mod main_lib;


use cli::Cli;
use config::Config;
use main_lib::{build_engine, init_tracing};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let engine = build_engine(&config)?;
    commands::execute(&engine, cli.command, cli.compact)
}
