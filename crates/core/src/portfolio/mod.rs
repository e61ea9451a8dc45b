//! Portfolio module - books, holding timelines, transactions and valuation.

mod portfolio_book;
mod portfolio_model;
pub mod timeline;
pub mod transactions;
pub mod valuation;

pub use portfolio_book::PortfolioBook;
pub use portfolio_model::{initial_quantity, HoldingQuantity, InitialWeight, NewPortfolio, Portfolio};
pub use timeline::{Breakpoint, HoldingTimeline};
pub use transactions::{NewTransaction, Transaction, TransactionLeg, TransactionProcessor, TransactionSide};
pub use valuation::{
    AssetValuation, ValuationPoint, ValuationService, ValuationServiceTrait, WeightPoint,
};


#[cfg(test)]
pub(crate) mod test_fixtures;
