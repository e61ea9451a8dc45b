//! Shared fixtures for portfolio tests: a three-asset portfolio seeded the
//! way the loader seeds it, with prices around a mid-May rebalance.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::portfolio::{initial_quantity, NewPortfolio, PortfolioBook};
use crate::prices::{InMemoryPriceStore, PriceRecord, PriceStoreTrait};
use crate::settings::DuplicatePricePolicy;

pub const PORTFOLIO: &str = "Portfolio 1";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn inception() -> NaiveDate {
    date(2022, 2, 15)
}

/// Asserts `a` and `b` differ by at most `tolerance`.
pub fn assert_close(a: Decimal, b: Decimal, tolerance: Decimal) {
    assert!(
        (a - b).abs() <= tolerance,
        "expected {} ≈ {} (tolerance {})",
        a,
        b,
        tolerance
    );
}

/// Prices for EEUU, Europa and Japón. Europa has no price on 2022-05-17.
pub fn price_records() -> Vec<PriceRecord> {
    let rows: [(NaiveDate, Option<Decimal>, Option<Decimal>, Option<Decimal>); 5] = [
        (date(2022, 2, 15), Some(dec!(100)), Some(dec!(50)), Some(dec!(25))),
        (date(2022, 5, 14), Some(dec!(115)), Some(dec!(78)), Some(dec!(26))),
        (date(2022, 5, 15), Some(dec!(120)), Some(dec!(80)), Some(dec!(27))),
        (date(2022, 5, 16), Some(dec!(121)), Some(dec!(81)), Some(dec!(27.5))),
        (date(2022, 5, 17), Some(dec!(122)), None, Some(dec!(28))),
    ];
    let mut records = Vec::new();
    for (day, eeuu, europa, japon) in rows {
        for (asset, price) in [("EEUU", eeuu), ("Europa", europa), ("Japón", japon)] {
            if let Some(price) = price {
                records.push(PriceRecord::new(asset, day, price));
            }
        }
    }
    records
}

pub fn price_store() -> Arc<InMemoryPriceStore> {
    let store = InMemoryPriceStore::new(DuplicatePricePolicy::Reject);
    store.insert_prices(&price_records()).unwrap();
    Arc::new(store)
}

/// $1,000,000,000 split 20/30/50 on 2022-02-15:
/// EEUU 2,000,000 units, Europa 6,000,000 units, Japón 20,000,000 units.
pub fn seeded_book(store: &dyn PriceStoreTrait) -> PortfolioBook {
    let portfolio = NewPortfolio::new(PORTFOLIO).into_portfolio().unwrap();
    let mut book = PortfolioBook::new(portfolio.clone());
    for (asset, weight) in [("EEUU", dec!(0.20)), ("Europa", dec!(0.30)), ("Japón", dec!(0.50))] {
        let price = store.price_at(asset, inception()).unwrap();
        let quantity = initial_quantity(weight, portfolio.initial_value, price).unwrap();
        book.initialize_holding(asset, inception(), quantity).unwrap();
    }
    book
}
