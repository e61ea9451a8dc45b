//! Transactions - paired sell/buy legs that move value between assets.

mod transaction_processor;
mod transactions_model;

#[cfg(test)]
mod transaction_processor_tests;

pub use transaction_processor::TransactionProcessor;
pub use transactions_model::{NewTransaction, Transaction, TransactionLeg, TransactionSide};
