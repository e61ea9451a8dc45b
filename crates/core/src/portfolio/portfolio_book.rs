use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::portfolio_model::{HoldingQuantity, Portfolio};
use super::timeline::{Breakpoint, HoldingTimeline};
use super::transactions::Transaction;
use crate::errors::{Error, Result};

/// Everything a portfolio owns: one holding timeline per asset it ever held
/// and the append-only ledger of accepted transactions.
///
/// The engine keeps each book behind its own lock; code holding `&mut
/// PortfolioBook` is the portfolio's single writer.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioBook {
    portfolio: Portfolio,
    timelines: BTreeMap<String, HoldingTimeline>,
    transactions: Vec<Transaction>,
}

impl PortfolioBook {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            portfolio,
            timelines: BTreeMap::new(),
            transactions: Vec::new(),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn name(&self) -> &str {
        &self.portfolio.name
    }

    /// Starts the timeline of `asset` with its initial allocation.
    pub fn initialize_holding(
        &mut self,
        asset: &str,
        date: NaiveDate,
        quantity: Decimal,
    ) -> Result<()> {
        let name = &self.portfolio.name;
        match self.timelines.get_mut(asset) {
            Some(existing) => existing
                .initialize(date, quantity)
                .map_err(|e| e.into_error(name, asset)),
            None => {
                // Only a timeline that accepted its first breakpoint joins the book.
                let mut timeline = HoldingTimeline::new();
                timeline
                    .initialize(date, quantity)
                    .map_err(|e| e.into_error(name, asset))?;
                self.timelines.insert(asset.to_string(), timeline);
                Ok(())
            }
        }
    }

    pub fn timeline(&self, asset: &str) -> Option<&HoldingTimeline> {
        self.timelines.get(asset)
    }

    pub fn timelines(&self) -> impl Iterator<Item = (&str, &HoldingTimeline)> {
        self.timelines.iter().map(|(asset, tl)| (asset.as_str(), tl))
    }

    /// Assets this portfolio has a timeline for, sorted by name.
    pub fn asset_names(&self) -> Vec<String> {
        self.timelines.keys().cloned().collect()
    }

    pub fn has_asset(&self, asset: &str) -> bool {
        self.timelines.contains_key(asset)
    }

    pub fn quantity_at(&self, asset: &str, date: NaiveDate) -> Result<Decimal> {
        self.timelines
            .get(asset)
            .ok_or_else(|| self.uninitialized(asset))?
            .quantity_at(date)
            .map_err(|e| e.into_error(&self.portfolio.name, asset))
    }

    /// Quantities of every asset on `date`, including zero positions.
    pub fn holdings_at(&self, date: NaiveDate) -> Result<Vec<HoldingQuantity>> {
        self.timelines
            .iter()
            .map(|(asset, timeline)| {
                let quantity = timeline
                    .quantity_at(date)
                    .map_err(|e| e.into_error(&self.portfolio.name, asset))?;
                Ok(HoldingQuantity {
                    asset: asset.clone(),
                    quantity,
                })
            })
            .collect()
    }

    /// Appends one breakpoint to each of two timelines as a single unit.
    ///
    /// If the second append fails the first is rolled back, so either both
    /// breakpoints are visible afterwards or neither is.
    pub(crate) fn append_pair(
        &mut self,
        first: (&str, Breakpoint),
        second: (&str, Breakpoint),
    ) -> Result<()> {
        let (first_asset, first_bp) = first;
        let (second_asset, second_bp) = second;
        let name = self.portfolio.name.clone();

        self.timelines
            .get_mut(first_asset)
            .ok_or_else(|| Error::UninitializedTimeline {
                portfolio: name.clone(),
                asset: first_asset.to_string(),
            })?
            .append_breakpoint(first_bp.effective_date, first_bp.quantity)
            .map_err(|e| e.into_error(&name, first_asset))?;

        let second_result = match self.timelines.get_mut(second_asset) {
            Some(timeline) => timeline
                .append_breakpoint(second_bp.effective_date, second_bp.quantity)
                .map_err(|e| e.into_error(&name, second_asset)),
            None => Err(Error::UninitializedTimeline {
                portfolio: name.clone(),
                asset: second_asset.to_string(),
            }),
        };

        if let Err(e) = second_result {
            if let Some(timeline) = self.timelines.get_mut(first_asset) {
                timeline.rollback_last();
            }
            return Err(e);
        }
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn record_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub(crate) fn next_transaction_seq(&self) -> usize {
        self.transactions.len() + 1
    }

    fn uninitialized(&self, asset: &str) -> Error {
        Error::UninitializedTimeline {
            portfolio: self.portfolio.name.clone(),
            asset: asset.to_string(),
        }
    }
}
