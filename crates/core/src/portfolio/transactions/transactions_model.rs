//! Transaction domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionSide {
    Buy,
    Sell,
}

impl TransactionSide {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionSide::Buy => "BUY",
            TransactionSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TransactionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A "process transaction" request: sell `amount` dollars of `sell_asset` and
/// buy `amount` dollars of `buy_asset` on `date`. There is no cash leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub portfolio: String,
    pub sell_asset: String,
    pub buy_asset: String,
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl NewTransaction {
    pub fn new(
        portfolio: impl Into<String>,
        sell_asset: impl Into<String>,
        buy_asset: impl Into<String>,
        date: NaiveDate,
        amount: Decimal,
    ) -> Self {
        Self {
            portfolio: portfolio.into(),
            sell_asset: sell_asset.into(),
            buy_asset: buy_asset.into(),
            date,
            amount,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.portfolio.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "portfolio".to_string(),
            )));
        }
        if self.sell_asset.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "sellAsset".to_string(),
            )));
        }
        if self.buy_asset.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "buyAsset".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::NonPositiveAmount(
                self.amount,
            )));
        }
        if self.sell_asset == self.buy_asset {
            return Err(Error::Validation(ValidationError::SameAsset(
                self.sell_asset.clone(),
            )));
        }
        Ok(())
    }
}

/// One side of an accepted transaction, with the figures it was executed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLeg {
    pub side: TransactionSide,
    pub asset: String,
    pub amount: Decimal,
    pub price: Decimal,
    /// Units removed (sell) or added (buy); always non-negative.
    pub quantity_delta: Decimal,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
}

/// An accepted transaction. Immutable; a reversal is a new offsetting transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// `{portfolio}:{date}:{sequence}`
    pub id: String,
    pub portfolio: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub sell: TransactionLeg,
    pub buy: TransactionLeg,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - sell {} / buy {} ({}): ${}",
            self.portfolio, self.sell.asset, self.buy.asset, self.date, self.amount
        )
    }
}
