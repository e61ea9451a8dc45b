//! Portfolio valuation domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One asset's line in a valuation point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetValuation {
    pub asset: String,
    pub quantity: Decimal,
    /// `None` when the asset has no price on the date
    pub price: Option<Decimal>,
    /// x_{i,t} = p_{i,t} * c_{i,t}
    pub amount: Option<Decimal>,
    /// w_{i,t} = x_{i,t} / V_t; `None` when V_t is zero or unknown
    pub weight: Option<Decimal>,
}

/// Amounts, weights and total value of a portfolio on one date. Derived, never stored.
///
/// A point is incomplete when an asset with a non-zero holding has no price
/// on the date; such a point carries no total and no weights rather than a
/// wrong total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPoint {
    pub portfolio: String,
    pub date: NaiveDate,
    pub holdings: Vec<AssetValuation>,
    /// V_t = Σ x_{i,t}
    pub total_value: Option<Decimal>,
    /// Held assets without a price on this date, sorted
    pub missing_prices: Vec<String>,
}

impl ValuationPoint {
    pub fn is_complete(&self) -> bool {
        self.missing_prices.is_empty()
    }

    pub fn holding(&self, asset: &str) -> Option<&AssetValuation> {
        self.holdings.iter().find(|h| h.asset == asset)
    }

    pub fn amount_of(&self, asset: &str) -> Option<Decimal> {
        self.holding(asset).and_then(|h| h.amount)
    }

    pub fn weight_of(&self, asset: &str) -> Option<Decimal> {
        self.holding(asset).and_then(|h| h.weight)
    }

    pub fn weight_sum(&self) -> Option<Decimal> {
        match self.total_value {
            Some(total) if !total.is_zero() => {
                Some(self.holdings.iter().filter_map(|h| h.weight).sum())
            }
            _ => None,
        }
    }
}

/// Weights-only projection of a [`ValuationPoint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightPoint {
    pub portfolio: String,
    pub date: NaiveDate,
    /// asset -> weight; `None` when the date's weights are undefined
    pub weights: Option<BTreeMap<String, Decimal>>,
    pub missing_prices: Vec<String>,
}

impl WeightPoint {
    pub fn is_complete(&self) -> bool {
        self.missing_prices.is_empty()
    }
}

impl From<ValuationPoint> for WeightPoint {
    fn from(point: ValuationPoint) -> Self {
        let defined = point.total_value.is_some_and(|total| !total.is_zero());
        let weights = defined.then(|| {
            point
                .holdings
                .iter()
                .filter_map(|h| h.weight.map(|w| (h.asset.clone(), w)))
                .collect()
        });
        Self {
            portfolio: point.portfolio,
            date: point.date,
            weights,
            missing_prices: point.missing_prices,
        }
    }
}
