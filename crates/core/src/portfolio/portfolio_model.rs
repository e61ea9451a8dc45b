//! Portfolio domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{default_initial_date, DEFAULT_INITIAL_VALUE};
use crate::errors::{Error, Result, ValidationError};

/// A portfolio with its initial value V₀ and inception date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub name: String,
    pub initial_value: Decimal,
    pub initial_date: NaiveDate,
}

/// Input model for creating a portfolio. Missing fields take the defaults
/// of the reference data set ($1,000,000,000 on 2022-02-15).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub name: String,
    #[serde(default)]
    pub initial_value: Option<Decimal>,
    #[serde(default)]
    pub initial_date: Option<NaiveDate>,
}

impl NewPortfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_initial_value(mut self, value: Decimal) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn with_initial_date(mut self, date: NaiveDate) -> Self {
        self.initial_date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if let Some(value) = self.initial_value {
            if value <= Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Initial value of portfolio '{}' must be positive, got {}",
                    self.name.trim(),
                    value
                ))));
            }
        }
        Ok(())
    }

    pub fn into_portfolio(self) -> Result<Portfolio> {
        self.validate()?;
        Ok(Portfolio {
            name: self.name.trim().to_string(),
            initial_value: self.initial_value.unwrap_or(DEFAULT_INITIAL_VALUE),
            initial_date: self.initial_date.unwrap_or_else(default_initial_date),
        })
    }
}

/// Initial weight w_{i,0} of an asset in a portfolio, as a fraction (0.15 = 15%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialWeight {
    pub portfolio: String,
    pub asset: String,
    pub weight: Decimal,
}

impl InitialWeight {
    pub fn new(portfolio: impl Into<String>, asset: impl Into<String>, weight: Decimal) -> Self {
        Self {
            portfolio: portfolio.into(),
            asset: asset.into(),
            weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.weight < Decimal::ZERO || self.weight > Decimal::ONE {
            return Err(Error::Validation(ValidationError::WeightOutOfRange {
                portfolio: self.portfolio.clone(),
                asset: self.asset.clone(),
                weight: self.weight,
            }));
        }
        Ok(())
    }
}

/// Quantity of one asset held on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingQuantity {
    pub asset: String,
    pub quantity: Decimal,
}

/// Computes C_{i,0} = (w_{i,0} * V₀) / P_{i,0}.
pub fn initial_quantity(weight: Decimal, initial_value: Decimal, price: Decimal) -> Result<Decimal> {
    if price <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Cannot derive an initial quantity from non-positive price {}",
            price
        ))));
    }
    weight
        .checked_mul(initial_value)
        .and_then(|value| value.checked_div(price))
        .ok_or_else(|| {
            Error::Unexpected(format!(
                "Overflow computing initial quantity {} * {} / {}",
                weight, initial_value, price
            ))
        })
}
