//! Price storage trait.
//!
//! Abstracts where price series live so the surrounding system can back the
//! engine with its own persistence. The engine only needs exact-date reads,
//! range scans and an append-only bulk insert.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::prices_model::{DailyPriceMap, PriceInsertSummary, PricePoint, PriceRecord};
use crate::errors::Result;

/// Storage interface for per-asset price series.
///
/// # Method Naming Convention
///
/// - `price_at` / `try_price_at` - exact-date lookups
/// - `dates_in_range*` - the calendar that drives valuation iteration
/// - `prices_in_range` - batch read used to value a whole range at once
pub trait PriceStoreTrait: Send + Sync {
    /// Bulk-inserts prices.
    ///
    /// The batch is validated as a whole before anything is written, so a
    /// rejected batch leaves the store unchanged. Duplicates are handled per
    /// the store's [`crate::settings::DuplicatePricePolicy`].
    fn insert_prices(&self, records: &[PriceRecord]) -> Result<PriceInsertSummary>;

    /// Returns the price of `asset` on exactly `date`.
    ///
    /// Fails with [`crate::Error::MissingPrice`] when there is none.
    fn price_at(&self, asset: &str, date: NaiveDate) -> Result<Decimal>;

    /// Like [`price_at`](Self::price_at) but a gap is `Ok(None)`.
    fn try_price_at(&self, asset: &str, date: NaiveDate) -> Result<Option<Decimal>>;

    /// Ordered dates in `[start, end]` on which at least one asset has a price.
    fn dates_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>>;

    /// Ordered dates in `[start, end]` on which at least one of `assets` has a price.
    fn dates_in_range_for(
        &self,
        assets: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>>;

    /// Prices of `assets` in `[start, end]`, grouped by date.
    ///
    /// Dates on which none of `assets` has a price are absent from the map.
    fn prices_in_range(
        &self,
        assets: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, DailyPriceMap>>;

    /// The full ordered series of one asset (empty if unknown).
    fn series(&self, asset: &str) -> Result<Vec<PricePoint>>;

    /// Names of all assets with at least one price, sorted.
    fn assets(&self) -> Result<Vec<String>>;

    /// Total number of stored prices.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
