use crate::errors::{Error, Result};
use crate::portfolio::portfolio_book::PortfolioBook;
use crate::portfolio::valuation::{AssetValuation, ValuationPoint};
use crate::prices::DailyPriceMap;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

/// Calculates amounts, total and weights for one portfolio on one date.
///
/// This is the per-date aggregation step shared by every valuation query:
/// `value_series` calls it once per date and `weights_series` projects its
/// output, so V_t is computed exactly once per date.
///
/// # Arguments
///
/// * `book` - The portfolio's timelines (read under the portfolio's read lock).
/// * `prices_today` - Prices available on `target_date`, keyed by asset.
/// * `target_date` - The date being valued.
///
pub fn calculate_valuation(
    book: &PortfolioBook,
    prices_today: &DailyPriceMap,
    target_date: NaiveDate,
) -> Result<ValuationPoint> {
    let mut holdings = Vec::new();
    let mut missing_prices = Vec::new();
    let mut total = Decimal::ZERO;

    // --- 1. Amounts per asset ---
    for (asset, timeline) in book.timelines() {
        let quantity = timeline
            .quantity_at(target_date)
            .map_err(|e| e.into_error(book.name(), asset))?;
        let price = prices_today.get(asset).copied();

        let amount = match price {
            Some(price) => Some(multiply(price, quantity)?),
            None if quantity.is_zero() => Some(Decimal::ZERO),
            None => {
                missing_prices.push(asset.to_string());
                None
            }
        };
        if let Some(amount) = amount {
            total = total.checked_add(amount).ok_or_else(|| {
                Error::Unexpected(format!(
                    "Overflow summing portfolio '{}' on {}",
                    book.name(),
                    target_date
                ))
            })?;
        }

        holdings.push(AssetValuation {
            asset: asset.to_string(),
            quantity,
            price,
            amount,
            weight: None,
        });
    }

    if !missing_prices.is_empty() {
        debug!(
            "Price gap for {:?} on {} (portfolio '{}'). Point marked incomplete.",
            missing_prices,
            target_date,
            book.name()
        );
        return Ok(ValuationPoint {
            portfolio: book.name().to_string(),
            date: target_date,
            holdings,
            total_value: None,
            missing_prices,
        });
    }

    // --- 2. Weights ---
    if !total.is_zero() {
        for holding in &mut holdings {
            holding.weight = holding.amount.and_then(|amount| amount.checked_div(total));
        }
    }

    Ok(ValuationPoint {
        portfolio: book.name().to_string(),
        date: target_date,
        holdings,
        total_value: Some(total),
        missing_prices,
    })
}

fn multiply(price: Decimal, quantity: Decimal) -> Result<Decimal> {
    price.checked_mul(quantity).ok_or_else(|| {
        Error::Unexpected(format!(
            "Overflow valuing quantity {} at price {}",
            quantity, price
        ))
    })
}
