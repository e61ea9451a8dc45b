//! Command implementations. Each returns its report; `execute` prints it.

use anyhow::Result;
use chrono::NaiveDate;
use portval_core::constants::{DISPLAY_DECIMAL_PRECISION, WEIGHT_DISPLAY_PRECISION};
use portval_core::{
    HoldingQuantity, NewTransaction, PortfolioEngine, Transaction, ValuationPoint, WeightPoint,
};
use serde::Serialize;

use crate::cli::{Commands, HoldingsArgs, RangeArgs, TransactArgs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsReport {
    pub portfolio: String,
    pub date: NaiveDate,
    pub holdings: Vec<HoldingQuantity>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactReport {
    pub transaction: Transaction,
    pub valuation: ValuationPoint,
}

pub fn execute(engine: &PortfolioEngine, command: Commands, compact: bool) -> Result<()> {
    match command {
        Commands::Value(args) => print_json(&value(engine, &args)?, compact),
        Commands::Weights(args) => print_json(&weights(engine, &args)?, compact),
        Commands::Holdings(args) => print_json(&holdings(engine, &args)?, compact),
        Commands::Transact(args) => print_json(&transact(engine, &args)?, compact),
    }
}

pub fn value(engine: &PortfolioEngine, args: &RangeArgs) -> Result<Vec<ValuationPoint>> {
    let (start, end) = resolve_range(engine, args)?;
    Ok(engine
        .value_series(&args.portfolio, start, end)?
        .into_iter()
        .map(round_point)
        .collect())
}

pub fn weights(engine: &PortfolioEngine, args: &RangeArgs) -> Result<Vec<WeightPoint>> {
    let (start, end) = resolve_range(engine, args)?;
    Ok(engine
        .weights_series(&args.portfolio, start, end)?
        .into_iter()
        .map(round_weights)
        .collect())
}

pub fn holdings(engine: &PortfolioEngine, args: &HoldingsArgs) -> Result<HoldingsReport> {
    Ok(HoldingsReport {
        portfolio: args.portfolio.clone(),
        date: args.date,
        holdings: engine.holdings_at(&args.portfolio, args.date)?,
    })
}

pub fn transact(engine: &PortfolioEngine, args: &TransactArgs) -> Result<TransactReport> {
    let transaction = engine.process_transaction(&NewTransaction::new(
        args.portfolio.clone(),
        args.sell.clone(),
        args.buy.clone(),
        args.date,
        args.amount,
    ))?;
    let valuation = round_point(engine.valuation_at(&args.portfolio, args.date)?);
    Ok(TransactReport {
        transaction,
        valuation,
    })
}

/// Fills a missing start with the portfolio's inception and a missing end
/// with the latest price of any of its assets.
fn resolve_range(engine: &PortfolioEngine, args: &RangeArgs) -> Result<(NaiveDate, NaiveDate)> {
    let start = match args.start {
        Some(start) => start,
        None => engine.get_portfolio(&args.portfolio)?.initial_date,
    };
    let end = match args.end {
        Some(end) => end,
        None => latest_price_date(engine, &args.portfolio)?.unwrap_or(start),
    };
    Ok((start, end))
}

fn latest_price_date(engine: &PortfolioEngine, portfolio: &str) -> Result<Option<NaiveDate>> {
    let store = engine.price_store();
    let mut latest = None;
    for asset in engine.portfolio_assets(portfolio)? {
        let last = store.series(&asset)?.last().map(|p| p.date);
        latest = latest.max(last);
    }
    Ok(latest)
}

fn round_point(mut point: ValuationPoint) -> ValuationPoint {
    for holding in &mut point.holdings {
        holding.amount = holding.amount.map(|a| a.round_dp(DISPLAY_DECIMAL_PRECISION));
        holding.weight = holding.weight.map(|w| w.round_dp(WEIGHT_DISPLAY_PRECISION));
    }
    point.total_value = point
        .total_value
        .map(|v| v.round_dp(DISPLAY_DECIMAL_PRECISION));
    point
}

fn round_weights(mut point: WeightPoint) -> WeightPoint {
    if let Some(weights) = point.weights.as_mut() {
        for weight in weights.values_mut() {
            *weight = weight.round_dp(WEIGHT_DISPLAY_PRECISION);
        }
    }
    point
}

fn print_json<T: Serialize>(data: &T, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(data)?);
    } else {
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    Ok(())
}
