use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::transactions_model::{NewTransaction, Transaction, TransactionLeg, TransactionSide};
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::portfolio_book::PortfolioBook;
use crate::portfolio::timeline::Breakpoint;
use crate::prices::PriceStoreTrait;

/// Validates buy/sell requests and applies them to a portfolio book.
///
/// Application is synchronous and deterministic: the same book, prices and
/// request always produce the same breakpoints. Any failure leaves the book
/// exactly as it was.
#[derive(Clone)]
pub struct TransactionProcessor {
    price_store: Arc<dyn PriceStoreTrait>,
    quantity_threshold: Decimal,
}

impl TransactionProcessor {
    pub fn new(price_store: Arc<dyn PriceStoreTrait>, quantity_threshold: Decimal) -> Self {
        Self {
            price_store,
            quantity_threshold,
        }
    }

    /// Applies `request` to `book`.
    ///
    /// The caller holds `&mut PortfolioBook`, i.e. the portfolio's write lock,
    /// for the whole call.
    pub fn process(&self, book: &mut PortfolioBook, request: &NewTransaction) -> Result<Transaction> {
        request.validate()?;
        if request.portfolio != book.name() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Transaction for portfolio '{}' applied to portfolio '{}'",
                request.portfolio,
                book.name()
            ))));
        }

        let portfolio = book.name().to_string();
        let date = request.date;
        let amount = request.amount;
        let sell_asset = request.sell_asset.as_str();
        let buy_asset = request.buy_asset.as_str();

        for asset in [sell_asset, buy_asset] {
            if !book.has_asset(asset) {
                return Err(Error::UninitializedTimeline {
                    portfolio: portfolio.clone(),
                    asset: asset.to_string(),
                });
            }
        }

        let sell_price = self.price_store.price_at(sell_asset, date)?;
        let buy_price = self.price_store.price_at(buy_asset, date)?;

        let sell_qty_delta = divide(amount, sell_price)?;
        let current_sell_qty = book.quantity_at(sell_asset, date)?;
        let new_sell_qty = if current_sell_qty >= sell_qty_delta {
            current_sell_qty - sell_qty_delta
        } else if sell_qty_delta - current_sell_qty <= self.quantity_threshold {
            debug!(
                "Selling all of '{}' in '{}' on {} (shortfall {} within threshold)",
                sell_asset,
                portfolio,
                date,
                sell_qty_delta - current_sell_qty
            );
            Decimal::ZERO
        } else {
            return Err(Error::InsufficientHolding {
                portfolio,
                asset: sell_asset.to_string(),
                date,
                held: current_sell_qty,
                requested: sell_qty_delta,
            });
        };

        let buy_qty_delta = divide(amount, buy_price)?;
        let current_buy_qty = book.quantity_at(buy_asset, date)?;
        let new_buy_qty = current_buy_qty.checked_add(buy_qty_delta).ok_or_else(|| {
            Error::Unexpected(format!(
                "Overflow adding {} to holding {} of '{}'",
                buy_qty_delta, current_buy_qty, buy_asset
            ))
        })?;

        book.append_pair(
            (sell_asset, Breakpoint::new(date, new_sell_qty)),
            (buy_asset, Breakpoint::new(date, new_buy_qty)),
        )?;

        let transaction = Transaction {
            id: format!("{}:{}:{}", portfolio, date, book.next_transaction_seq()),
            portfolio: portfolio.clone(),
            date,
            amount,
            sell: TransactionLeg {
                side: TransactionSide::Sell,
                asset: sell_asset.to_string(),
                amount,
                price: sell_price,
                quantity_delta: current_sell_qty - new_sell_qty,
                quantity_before: current_sell_qty,
                quantity_after: new_sell_qty,
            },
            buy: TransactionLeg {
                side: TransactionSide::Buy,
                asset: buy_asset.to_string(),
                amount,
                price: buy_price,
                quantity_delta: buy_qty_delta,
                quantity_before: current_buy_qty,
                quantity_after: new_buy_qty,
            },
        };
        book.record_transaction(transaction.clone());

        info!("Accepted transaction {}", transaction);
        Ok(transaction)
    }
}

fn divide(amount: Decimal, price: Decimal) -> Result<Decimal> {
    amount.checked_div(price).ok_or_else(|| {
        Error::Unexpected(format!("Cannot divide amount {} by price {}", amount, price))
    })
}
