//! Price domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{Error, Result, ValidationError};

/// Prices of several assets on a single day, keyed by asset name.
pub type DailyPriceMap = HashMap<String, Decimal>;

/// One ingested price p_{i,t}: the price of `asset` on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub asset: String,
    pub date: NaiveDate,
    pub price: Decimal,
}

impl PriceRecord {
    pub fn new(asset: impl Into<String>, date: NaiveDate, price: Decimal) -> Self {
        Self {
            asset: asset.into(),
            date,
            price,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.asset.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "asset".to_string(),
            )));
        }
        if self.price <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::NonPositivePrice {
                asset: self.asset.clone(),
                date: self.date,
                price: self.price,
            }));
        }
        Ok(())
    }
}

/// A single dated price from one asset's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Outcome of a bulk price insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInsertSummary {
    pub inserted: usize,
    pub overwritten: usize,
}
