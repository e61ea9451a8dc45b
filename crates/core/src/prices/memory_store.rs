use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::prices_model::{DailyPriceMap, PriceInsertSummary, PricePoint, PriceRecord};
use super::prices_store::PriceStoreTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::settings::DuplicatePricePolicy;

type SeriesMap = HashMap<String, BTreeMap<NaiveDate, Decimal>>;

/// Price series held in memory, one ordered map per asset.
///
/// Reads share the lock; a bulk insert takes it exclusively for the whole
/// batch, so readers never observe half of an insert.
#[derive(Debug, Default)]
pub struct InMemoryPriceStore {
    policy: DuplicatePricePolicy,
    series: RwLock<SeriesMap>,
}

impl InMemoryPriceStore {
    pub fn new(policy: DuplicatePricePolicy) -> Self {
        Self {
            policy,
            series: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> DuplicatePricePolicy {
        self.policy
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SeriesMap>> {
        self.series
            .read()
            .map_err(|_| Error::Unexpected("Price store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SeriesMap>> {
        self.series
            .write()
            .map_err(|_| Error::Unexpected("Price store lock poisoned".to_string()))
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::Validation(ValidationError::InvalidDateRange {
            start,
            end,
        }));
    }
    Ok(())
}

impl PriceStoreTrait for InMemoryPriceStore {
    fn insert_prices(&self, records: &[PriceRecord]) -> Result<PriceInsertSummary> {
        for record in records {
            record.validate()?;
        }

        let mut series = self.write()?;

        if self.policy == DuplicatePricePolicy::Reject {
            let mut seen: HashSet<(&str, NaiveDate)> = HashSet::with_capacity(records.len());
            for record in records {
                let stored = series
                    .get(&record.asset)
                    .is_some_and(|s| s.contains_key(&record.date));
                if stored || !seen.insert((record.asset.as_str(), record.date)) {
                    return Err(Error::Validation(ValidationError::DuplicatePrice {
                        asset: record.asset.clone(),
                        date: record.date,
                    }));
                }
            }
        }

        let mut summary = PriceInsertSummary::default();
        for record in records {
            let asset_series = series.entry(record.asset.clone()).or_default();
            match asset_series.insert(record.date, record.price) {
                Some(_) => summary.overwritten += 1,
                None => summary.inserted += 1,
            }
        }

        debug!(
            "Inserted {} prices ({} overwritten) with policy '{}'",
            summary.inserted, summary.overwritten, self.policy
        );
        Ok(summary)
    }

    fn price_at(&self, asset: &str, date: NaiveDate) -> Result<Decimal> {
        self.try_price_at(asset, date)?
            .ok_or_else(|| Error::MissingPrice {
                asset: asset.to_string(),
                date,
            })
    }

    fn try_price_at(&self, asset: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        let series = self.read()?;
        Ok(series.get(asset).and_then(|s| s.get(&date)).copied())
    }

    fn dates_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        check_range(start, end)?;
        let series = self.read()?;
        let dates: BTreeSet<NaiveDate> = series
            .values()
            .flat_map(|s| s.range(start..=end).map(|(date, _)| *date))
            .collect();
        Ok(dates.into_iter().collect())
    }

    fn dates_in_range_for(
        &self,
        assets: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        check_range(start, end)?;
        let series = self.read()?;
        let dates: BTreeSet<NaiveDate> = assets
            .iter()
            .filter_map(|asset| series.get(asset))
            .flat_map(|s| s.range(start..=end).map(|(date, _)| *date))
            .collect();
        Ok(dates.into_iter().collect())
    }

    fn prices_in_range(
        &self,
        assets: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, DailyPriceMap>> {
        check_range(start, end)?;
        let series = self.read()?;
        let mut by_date: BTreeMap<NaiveDate, DailyPriceMap> = BTreeMap::new();
        for asset in assets {
            let Some(asset_series) = series.get(asset) else {
                continue;
            };
            for (date, price) in asset_series.range(start..=end) {
                by_date
                    .entry(*date)
                    .or_default()
                    .insert(asset.clone(), *price);
            }
        }
        Ok(by_date)
    }

    fn series(&self, asset: &str) -> Result<Vec<PricePoint>> {
        let series = self.read()?;
        Ok(series
            .get(asset)
            .map(|s| {
                s.iter()
                    .map(|(date, price)| PricePoint {
                        date: *date,
                        price: *price,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn assets(&self) -> Result<Vec<String>> {
        let series = self.read()?;
        let mut names: Vec<String> = series.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn len(&self) -> Result<usize> {
        let series = self.read()?;
        Ok(series.values().map(BTreeMap::len).sum())
    }
}
