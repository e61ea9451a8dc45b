//! CSV dataset directory reader.
//!
//! | File               | Columns                                     | Required |
//! |--------------------|---------------------------------------------|----------|
//! | `prices.csv`       | `asset,date,price`                          | yes      |
//! | `weights.csv`      | `portfolio,asset,weight`                    | yes      |
//! | `portfolios.csv`   | `name,initial_value,initial_date`           | no       |
//! | `assets.csv`       | `name,symbol`                               | no       |
//! | `transactions.csv` | `portfolio,sell_asset,buy_asset,date,amount`| no       |
//!
//! Weights are fractions (`0.2`) or percentages (`20%`).

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use portval_core::{
    InitialWeight, NewAsset, NewPortfolio, NewTransaction, PortfolioDataset, PriceRecord,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const PRICES_FILE: &str = "prices.csv";
pub const WEIGHTS_FILE: &str = "weights.csv";
pub const PORTFOLIOS_FILE: &str = "portfolios.csv";
pub const ASSETS_FILE: &str = "assets.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";

/// A dataset directory: the seed for the engine plus transactions to replay.
#[derive(Debug, Clone, Default)]
pub struct DatasetFiles {
    pub dataset: PortfolioDataset,
    pub transactions: Vec<NewTransaction>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    asset: String,
    date: String,
    price: String,
}

#[derive(Debug, Deserialize)]
struct WeightRow {
    portfolio: String,
    asset: String,
    weight: String,
}

#[derive(Debug, Deserialize)]
struct PortfolioRow {
    name: String,
    #[serde(default)]
    initial_value: Option<String>,
    #[serde(default)]
    initial_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetRow {
    name: String,
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    portfolio: String,
    sell_asset: String,
    buy_asset: String,
    date: String,
    amount: String,
}

pub fn load_dir(dir: &Path) -> Result<DatasetFiles> {
    let prices = read_rows(&dir.join(PRICES_FILE), |row: PriceRow| {
        Ok(PriceRecord::new(
            row.asset,
            parse_date("date", &row.date)?,
            parse_decimal("price", &row.price)?,
        ))
    })?;
    let weights = read_rows(&dir.join(WEIGHTS_FILE), |row: WeightRow| {
        Ok(InitialWeight::new(
            row.portfolio,
            row.asset,
            parse_weight(&row.weight)?,
        ))
    })?;
    let portfolios = read_optional_rows(&dir.join(PORTFOLIOS_FILE), |row: PortfolioRow| {
        let mut portfolio = NewPortfolio::new(row.name);
        if let Some(value) = non_empty(row.initial_value) {
            portfolio = portfolio.with_initial_value(parse_decimal("initial_value", &value)?);
        }
        if let Some(date) = non_empty(row.initial_date) {
            portfolio = portfolio.with_initial_date(parse_date("initial_date", &date)?);
        }
        Ok(portfolio)
    })?;
    let assets = read_optional_rows(&dir.join(ASSETS_FILE), |row: AssetRow| {
        let asset = NewAsset::new(row.name);
        Ok(match non_empty(row.symbol) {
            Some(symbol) => asset.with_symbol(symbol),
            None => asset,
        })
    })?;
    let transactions = read_optional_rows(&dir.join(TRANSACTIONS_FILE), |row: TransactionRow| {
        Ok(NewTransaction::new(
            row.portfolio,
            row.sell_asset,
            row.buy_asset,
            parse_date("date", &row.date)?,
            parse_decimal("amount", &row.amount)?,
        ))
    })?;

    Ok(DatasetFiles {
        dataset: PortfolioDataset {
            assets,
            portfolios,
            weights,
            prices,
        },
        transactions,
    })
}

fn read_optional_rows<T, R>(path: &Path, convert: impl Fn(T) -> Result<R>) -> Result<Vec<R>>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_rows(path, convert)
}

fn read_rows<T, R>(path: &Path, convert: impl Fn(T) -> Result<R>) -> Result<Vec<R>>
where
    T: DeserializeOwned,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<T>().enumerate() {
        // Line 1 is the header
        let line = index + 2;
        let row = row.with_context(|| format!("{}:{}: malformed row", path.display(), line))?;
        rows.push(convert(row).with_context(|| format!("{}:{}", path.display(), line))?);
    }
    Ok(rows)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} '{}', expected YYYY-MM-DD", field, value))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .with_context(|| format!("Invalid {} '{}'", field, value))
}

fn parse_weight(value: &str) -> Result<Decimal> {
    match value.trim().strip_suffix('%') {
        Some(percent) => Ok(parse_decimal("weight", percent)? / Decimal::ONE_HUNDRED),
        None => parse_decimal("weight", value),
    }
}
