use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use portval_core::{DuplicatePricePolicy, EngineSettings, PriceWindow};
use rust_decimal::Decimal;

/// Runtime configuration, read from `PORTVAL_*` environment variables
/// (a `.env` file is honored).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub duplicate_prices: DuplicatePricePolicy,
    pub weight_tolerance: Option<Decimal>,
    pub price_window: Option<PriceWindow>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = lookup("PORTVAL_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let duplicate_prices = match lookup("PORTVAL_DUPLICATE_PRICES") {
            Some(value) => value
                .parse()
                .context("Invalid PORTVAL_DUPLICATE_PRICES")?,
            None => DuplicatePricePolicy::default(),
        };

        let weight_tolerance = lookup("PORTVAL_WEIGHT_TOLERANCE")
            .map(|value| {
                value
                    .trim()
                    .parse::<Decimal>()
                    .with_context(|| format!("Invalid PORTVAL_WEIGHT_TOLERANCE '{}'", value))
            })
            .transpose()?;

        let price_window = match lookup("PORTVAL_PRICE_WINDOW") {
            Some(value) => parse_price_window(&value)
                .with_context(|| format!("Invalid PORTVAL_PRICE_WINDOW '{}'", value))?,
            None => None,
        };

        Ok(Self {
            data_dir,
            duplicate_prices,
            weight_tolerance,
            price_window,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        let mut settings = EngineSettings::default()
            .with_duplicate_price_policy(self.duplicate_prices)
            .with_price_window(self.price_window);
        if let Some(tolerance) = self.weight_tolerance {
            settings.weight_sum_tolerance = tolerance;
        }
        settings
    }
}

/// `none`, `default` (2022-02-15..2023-02-16) or `START..END`.
fn parse_price_window(value: &str) -> Result<Option<PriceWindow>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if value.eq_ignore_ascii_case("default") {
        return Ok(Some(PriceWindow::default()));
    }
    let Some((start, end)) = value.split_once("..") else {
        bail!("expected 'none', 'default' or 'YYYY-MM-DD..YYYY-MM-DD'");
    };
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")?;
    Ok(Some(PriceWindow::new(start, end)?))
}
