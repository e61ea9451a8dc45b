use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::ingestion_model::{LoadReport, PortfolioDataset};
use crate::assets::{Asset, NewAsset};
use crate::engine::PortfolioEngine;
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::{initial_quantity, InitialWeight, NewPortfolio, Portfolio};
use crate::prices::PriceRecord;
use crate::settings::EngineSettings;

/// A holding to start at the portfolio's inception.
#[derive(Debug)]
struct HoldingSeed {
    portfolio: String,
    asset: String,
    date: NaiveDate,
    quantity: Decimal,
}

/// Seeds a [`PortfolioEngine`] from a [`PortfolioDataset`].
pub struct IngestionService {
    settings: EngineSettings,
}

impl IngestionService {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Registers the dataset's assets and portfolios, stores its prices and
    /// starts one holding timeline per initial weight with
    /// `C = w * V0 / P` at the portfolio's inception date.
    ///
    /// The whole dataset is checked before the engine is touched. Price rows
    /// for unregistered assets, or outside the configured window, are skipped
    /// and counted rather than rejected.
    pub fn load(&self, engine: &PortfolioEngine, dataset: PortfolioDataset) -> Result<LoadReport> {
        let started = Instant::now();
        let PortfolioDataset {
            assets,
            portfolios,
            weights,
            prices,
        } = dataset;
        let weights = normalize_weights(weights);

        let new_assets = resolve_assets(engine, assets, &weights)?;
        let new_portfolios = resolve_portfolios(engine, portfolios, &weights)?;

        let mut known_assets: HashSet<String> =
            engine.list_assets().into_iter().map(|a| a.name).collect();
        known_assets.extend(new_assets.iter().map(|a| a.name.clone()));
        let mut known_portfolios: HashMap<String, Portfolio> = engine
            .list_portfolios()?
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        known_portfolios.extend(new_portfolios.iter().map(|p| (p.name.clone(), p.clone())));

        self.check_weights(engine, &weights, &known_assets, &known_portfolios)?;

        let mut report = LoadReport::default();
        let prices = self.filter_prices(prices, &known_assets, &mut report);
        for record in &prices {
            record.validate()?;
        }

        let seeds = seed_holdings(engine, &weights, &known_portfolios, &prices)?;

        // The price insert is the only write that can still be refused
        // (duplicates under the reject policy), so it goes first.
        report.prices = engine.price_store().insert_prices(&prices)?;
        for asset in new_assets {
            engine.register_asset(asset)?;
            report.assets_created += 1;
        }
        for portfolio in new_portfolios {
            engine.register_portfolio(portfolio)?;
            report.portfolios_created += 1;
        }
        for seed in seeds {
            engine.initialize_holding(&seed.portfolio, &seed.asset, seed.date, seed.quantity)?;
            report.holdings_initialized += 1;
        }

        debug!(
            "Loaded {} assets, {} portfolios, {} holdings and {} prices ({} skipped) in {:?}",
            report.assets_created,
            report.portfolios_created,
            report.holdings_initialized,
            report.prices.inserted + report.prices.overwritten,
            report.prices_skipped(),
            started.elapsed()
        );
        Ok(report)
    }

    fn check_weights(
        &self,
        engine: &PortfolioEngine,
        weights: &[InitialWeight],
        known_assets: &HashSet<String>,
        known_portfolios: &HashMap<String, Portfolio>,
    ) -> Result<()> {
        let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(weights.len());
        let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();

        for weight in weights {
            weight.validate()?;
            if !known_portfolios.contains_key(&weight.portfolio) {
                return Err(Error::NotFound(format!(
                    "Portfolio '{}' referenced by an initial weight",
                    weight.portfolio
                )));
            }
            if !known_assets.contains(&weight.asset) {
                return Err(Error::NotFound(format!(
                    "Asset '{}' referenced by an initial weight of portfolio '{}'",
                    weight.asset, weight.portfolio
                )));
            }
            if !seen.insert((weight.portfolio.as_str(), weight.asset.as_str()))
                || engine.has_holding(&weight.portfolio, &weight.asset)?
            {
                return Err(Error::Validation(ValidationError::DuplicateWeight {
                    portfolio: weight.portfolio.clone(),
                    asset: weight.asset.clone(),
                }));
            }
            *sums.entry(weight.portfolio.as_str()).or_default() += weight.weight;
        }

        for (portfolio, sum) in sums {
            if (sum - Decimal::ONE).abs() > self.settings.weight_sum_tolerance {
                warn!(
                    "Initial weights of portfolio '{}' sum to {} instead of 1",
                    portfolio, sum
                );
            }
        }
        Ok(())
    }

    fn filter_prices(
        &self,
        prices: Vec<PriceRecord>,
        known_assets: &HashSet<String>,
        report: &mut LoadReport,
    ) -> Vec<PriceRecord> {
        let mut unknown: BTreeMap<String, usize> = BTreeMap::new();
        let mut kept = Vec::with_capacity(prices.len());

        for mut record in prices {
            record.asset = record.asset.trim().to_string();
            if !known_assets.contains(&record.asset) {
                *unknown.entry(record.asset).or_default() += 1;
                continue;
            }
            if let Some(window) = &self.settings.price_window {
                if !window.contains(record.date) {
                    report.prices_skipped_outside_window += 1;
                    continue;
                }
            }
            kept.push(record);
        }

        for (asset, count) in &unknown {
            warn!("Skipped {} price rows for unknown asset '{}'", count, asset);
        }
        report.prices_skipped_unknown_asset = unknown.values().sum();
        if let Some(window) = &self.settings.price_window {
            if report.prices_skipped_outside_window > 0 {
                warn!(
                    "Skipped {} price rows outside {} to {}",
                    report.prices_skipped_outside_window, window.start, window.end
                );
            }
        }
        kept
    }
}

fn normalize_weights(weights: Vec<InitialWeight>) -> Vec<InitialWeight> {
    weights
        .into_iter()
        .map(|w| InitialWeight::new(w.portfolio.trim(), w.asset.trim(), w.weight))
        .collect()
}

/// Assets to register. When none are listed they are taken from the weights,
/// skipping names the engine already knows.
fn resolve_assets(
    engine: &PortfolioEngine,
    assets: Vec<NewAsset>,
    weights: &[InitialWeight],
) -> Result<Vec<Asset>> {
    let mut seen = HashSet::new();
    if assets.is_empty() {
        return weights
            .iter()
            .filter(|w| seen.insert(w.asset.clone()))
            .filter(|w| !engine.has_asset(&w.asset))
            .map(|w| NewAsset::new(w.asset.clone()).into_asset())
            .collect();
    }

    let mut resolved = Vec::with_capacity(assets.len());
    for new_asset in assets {
        let asset = new_asset.into_asset()?;
        if engine.has_asset(&asset.name) || !seen.insert(asset.name.clone()) {
            return Err(Error::Validation(ValidationError::DuplicateAsset(
                asset.name,
            )));
        }
        resolved.push(asset);
    }
    Ok(resolved)
}

/// Portfolios to register. When none are listed they are taken from the
/// weights with default initial value and date.
fn resolve_portfolios(
    engine: &PortfolioEngine,
    portfolios: Vec<NewPortfolio>,
    weights: &[InitialWeight],
) -> Result<Vec<Portfolio>> {
    let mut seen = HashSet::new();
    if portfolios.is_empty() {
        return weights
            .iter()
            .filter(|w| seen.insert(w.portfolio.clone()))
            .filter(|w| !engine.has_portfolio(&w.portfolio))
            .map(|w| NewPortfolio::new(w.portfolio.clone()).into_portfolio())
            .collect();
    }

    let mut resolved = Vec::with_capacity(portfolios.len());
    for new_portfolio in portfolios {
        let portfolio = new_portfolio.into_portfolio()?;
        if engine.has_portfolio(&portfolio.name) || !seen.insert(portfolio.name.clone()) {
            return Err(Error::Validation(ValidationError::DuplicatePortfolio(
                portfolio.name,
            )));
        }
        resolved.push(portfolio);
    }
    Ok(resolved)
}

/// Initial quantities per weight. Prices come from the incoming batch first,
/// then from the store; a zero weight needs no price.
fn seed_holdings(
    engine: &PortfolioEngine,
    weights: &[InitialWeight],
    portfolios: &HashMap<String, Portfolio>,
    prices: &[PriceRecord],
) -> Result<Vec<HoldingSeed>> {
    let batch: HashMap<(&str, NaiveDate), Decimal> = prices
        .iter()
        .map(|r| ((r.asset.as_str(), r.date), r.price))
        .collect();
    let store = engine.price_store();

    weights
        .iter()
        .map(|weight| {
            let portfolio = portfolios.get(&weight.portfolio).ok_or_else(|| {
                Error::NotFound(format!("Portfolio '{}'", weight.portfolio))
            })?;
            let date = portfolio.initial_date;
            let quantity = if weight.weight.is_zero() {
                Decimal::ZERO
            } else {
                let price = match batch.get(&(weight.asset.as_str(), date)) {
                    Some(price) => *price,
                    None => store.price_at(&weight.asset, date)?,
                };
                initial_quantity(weight.weight, portfolio.initial_value, price)?
            };
            Ok(HoldingSeed {
                portfolio: weight.portfolio.clone(),
                asset: weight.asset.clone(),
                date,
                quantity,
            })
        })
        .collect()
}
