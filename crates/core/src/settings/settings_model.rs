//! Engine configuration.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{ymd, DEFAULT_PRICE_WINDOW_YMD, QUANTITY_THRESHOLD, WEIGHT_SUM_TOLERANCE};
use crate::errors::{Error, Result, ValidationError};

/// What the price store does when an `(asset, date)` price already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePricePolicy {
    /// The whole insert batch is refused
    #[default]
    Reject,
    /// The incoming price replaces the stored one
    Overwrite,
}

impl DuplicatePricePolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DuplicatePricePolicy::Reject => "reject",
            DuplicatePricePolicy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for DuplicatePricePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePricePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(DuplicatePricePolicy::Reject),
            "overwrite" => Ok(DuplicatePricePolicy::Overwrite),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown duplicate price policy '{}' (expected 'reject' or 'overwrite')",
                other
            )))),
        }
    }
}

/// Inclusive date window for ingested prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PriceWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::Validation(ValidationError::InvalidDateRange {
                start,
                end,
            }));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for PriceWindow {
    /// 2022-02-15 ..= 2023-02-16, the span of the reference price sheet.
    fn default() -> Self {
        let (start, end) = DEFAULT_PRICE_WINDOW_YMD;
        Self {
            start: ymd(start),
            end: ymd(end),
        }
    }
}

/// Settings shared by the price store, transaction processor and loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default)]
    pub duplicate_price_policy: DuplicatePricePolicy,
    #[serde(default = "default_quantity_threshold")]
    pub quantity_threshold: Decimal,
    #[serde(default = "default_weight_sum_tolerance")]
    pub weight_sum_tolerance: Decimal,
    /// Prices outside this window are skipped at ingestion; `None` accepts all.
    #[serde(default)]
    pub price_window: Option<PriceWindow>,
}

fn default_quantity_threshold() -> Decimal {
    QUANTITY_THRESHOLD
}

fn default_weight_sum_tolerance() -> Decimal {
    WEIGHT_SUM_TOLERANCE
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            duplicate_price_policy: DuplicatePricePolicy::default(),
            quantity_threshold: QUANTITY_THRESHOLD,
            weight_sum_tolerance: WEIGHT_SUM_TOLERANCE,
            price_window: None,
        }
    }
}

impl EngineSettings {
    pub fn with_duplicate_price_policy(mut self, policy: DuplicatePricePolicy) -> Self {
        self.duplicate_price_policy = policy;
        self
    }

    pub fn with_price_window(mut self, window: Option<PriceWindow>) -> Self {
        self.price_window = window;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.quantity_threshold.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Quantity threshold must not be negative, got {}",
                self.quantity_threshold
            ))));
        }
        if self.weight_sum_tolerance.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Weight sum tolerance must not be negative, got {}",
                self.weight_sum_tolerance
            ))));
        }
        Ok(())
    }
}
