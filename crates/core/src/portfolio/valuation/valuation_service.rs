use crate::errors::{Error as CoreError, Result as CoreResult, ValidationError};
use crate::portfolio::portfolio_book::PortfolioBook;
use crate::portfolio::valuation::valuation_calculator::calculate_valuation;
use crate::portfolio::valuation::valuation_model::{ValuationPoint, WeightPoint};
use crate::prices::{DailyPriceMap, PriceStoreTrait};
use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;
use std::time::Instant;

pub trait ValuationServiceTrait: Send + Sync {
    /// Values the portfolio on every date in `[start_date, end_date]` on which
    /// at least one of its assets has a price.
    ///
    /// Args:
    ///     book: The portfolio's book, read under its read lock.
    ///     start_date: First date (inclusive).
    ///     end_date: Last date (inclusive).
    ///
    /// Returns:
    ///     Points in strictly increasing date order. Dates with a price gap
    ///     for a held asset are returned flagged incomplete, not dropped.
    fn value_series(
        &self,
        book: &PortfolioBook,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CoreResult<Vec<ValuationPoint>>;

    /// Same dates and aggregation as [`value_series`](Self::value_series),
    /// projected to weights.
    fn weights_series(
        &self,
        book: &PortfolioBook,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CoreResult<Vec<WeightPoint>>;

    /// Values the portfolio on a single date, whether or not any price exists for it.
    fn valuation_at(&self, book: &PortfolioBook, date: NaiveDate) -> CoreResult<ValuationPoint>;
}

#[derive(Clone)]
pub struct ValuationService {
    price_store: Arc<dyn PriceStoreTrait>,
}

impl ValuationService {
    pub fn new(price_store: Arc<dyn PriceStoreTrait>) -> Self {
        Self { price_store }
    }
}

impl ValuationServiceTrait for ValuationService {
    fn value_series(
        &self,
        book: &PortfolioBook,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CoreResult<Vec<ValuationPoint>> {
        if start_date > end_date {
            return Err(CoreError::Validation(ValidationError::InvalidDateRange {
                start: start_date,
                end: end_date,
            }));
        }
        let started = Instant::now();

        let assets = book.asset_names();
        let prices_by_date = self
            .price_store
            .prices_in_range(&assets, start_date, end_date)?;

        let points = prices_by_date
            .iter()
            .map(|(date, prices_today)| calculate_valuation(book, prices_today, *date))
            .collect::<CoreResult<Vec<_>>>()?;

        debug!(
            "Valued portfolio '{}' on {} dates from {} to {} in {:?}",
            book.name(),
            points.len(),
            start_date,
            end_date,
            started.elapsed()
        );
        Ok(points)
    }

    fn weights_series(
        &self,
        book: &PortfolioBook,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CoreResult<Vec<WeightPoint>> {
        Ok(self
            .value_series(book, start_date, end_date)?
            .into_iter()
            .map(WeightPoint::from)
            .collect())
    }

    fn valuation_at(&self, book: &PortfolioBook, date: NaiveDate) -> CoreResult<ValuationPoint> {
        let mut prices_today = DailyPriceMap::new();
        for asset in book.asset_names() {
            if let Some(price) = self.price_store.try_price_at(&asset, date)? {
                prices_today.insert(asset, price);
            }
        }
        calculate_valuation(book, &prices_today, date)
    }
}
