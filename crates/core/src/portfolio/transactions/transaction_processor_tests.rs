#[cfg(test)]
mod tests {
    use crate::constants::QUANTITY_THRESHOLD;
    use crate::errors::{Error, ValidationError};
    use crate::portfolio::test_fixtures::{
        assert_close, date, inception, price_store, seeded_book, PORTFOLIO,
    };
    use crate::portfolio::valuation::calculate_valuation;
    use crate::portfolio::{
        NewPortfolio, NewTransaction, PortfolioBook, TransactionProcessor, TransactionSide,
    };
    use crate::prices::{InMemoryPriceStore, PriceRecord, PriceStoreTrait};
    use crate::settings::DuplicatePricePolicy;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryPriceStore>, PortfolioBook, TransactionProcessor) {
        let store = price_store();
        let book = seeded_book(store.as_ref());
        let processor = TransactionProcessor::new(store.clone(), QUANTITY_THRESHOLD);
        (store, book, processor)
    }

    fn rebalance(date: NaiveDate, amount: Decimal) -> NewTransaction {
        NewTransaction::new(PORTFOLIO, "EEUU", "Europa", date, amount)
    }

    fn total_on(store: &InMemoryPriceStore, book: &PortfolioBook, day: NaiveDate) -> Decimal {
        let assets = book.asset_names();
        let prices = store.prices_in_range(&assets, day, day).unwrap();
        calculate_valuation(book, &prices[&day], day)
            .unwrap()
            .total_value
            .unwrap()
    }

    #[test]
    fn test_reference_rebalance_quantities() {
        let (_store, mut book, processor) = setup();
        let tx = processor
            .process(&mut book, &rebalance(date(2022, 5, 15), dec!(200000000)))
            .unwrap();

        // 200,000,000 / 120 ≈ 1,666,666.67 sold; 200,000,000 / 80 = 2,500,000 bought
        assert_close(tx.sell.quantity_delta, dec!(1666666.67), dec!(0.01));
        assert_close(tx.sell.quantity_after, dec!(333333.33), dec!(0.01));
        assert_eq!(tx.buy.quantity_delta, dec!(2500000));
        assert_eq!(tx.buy.quantity_after, dec!(8500000));
        assert_eq!(tx.sell.side, TransactionSide::Sell);
        assert_eq!(tx.buy.side, TransactionSide::Buy);
        assert_eq!(tx.sell.price, dec!(120));
        assert_eq!(tx.buy.price, dec!(80));
        assert_eq!(tx.id, "Portfolio 1:2022-05-15:1");

        // Takes effect on its own date, inclusive
        assert_close(
            book.quantity_at("EEUU", date(2022, 5, 15)).unwrap(),
            dec!(333333.33),
            dec!(0.01),
        );
        assert_close(
            book.quantity_at("EEUU", date(2022, 5, 16)).unwrap(),
            dec!(333333.33),
            dec!(0.01),
        );
        assert_eq!(
            book.quantity_at("EEUU", date(2022, 5, 14)).unwrap(),
            dec!(2000000)
        );
        assert_eq!(
            book.quantity_at("Europa", date(2022, 5, 16)).unwrap(),
            dec!(8500000)
        );
        assert_eq!(
            book.quantity_at("Europa", date(2022, 5, 14)).unwrap(),
            dec!(6000000)
        );
        assert_eq!(book.transactions().len(), 1);
    }

    #[test]
    fn test_transaction_conserves_total_value() {
        let (store, mut book, processor) = setup();
        let day = date(2022, 5, 15);
        let before = total_on(&store, &book, day);
        processor
            .process(&mut book, &rebalance(day, dec!(200000000)))
            .unwrap();
        let after = total_on(&store, &book, day);
        assert_close(before, after, dec!(0.000001));
        assert_eq!(before, dec!(1260000000));
    }

    #[test]
    fn test_missing_sell_price_rejects_without_mutation() {
        let (_store, mut book, processor) = setup();
        let untouched = book.clone();
        // No Europa price on 2022-05-17
        let request = NewTransaction::new(PORTFOLIO, "Europa", "EEUU", date(2022, 5, 17), dec!(10));
        let err = processor.process(&mut book, &request).unwrap_err();
        assert_eq!(
            err,
            Error::MissingPrice {
                asset: "Europa".to_string(),
                date: date(2022, 5, 17),
            }
        );
        assert_eq!(book, untouched);
    }

    #[test]
    fn test_missing_buy_price_rejects_without_mutation() {
        let (_store, mut book, processor) = setup();
        let untouched = book.clone();
        let err = processor
            .process(&mut book, &rebalance(date(2022, 5, 17), dec!(10)))
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrice { ref asset, .. } if asset == "Europa"));
        assert_eq!(book, untouched);
    }

    #[test]
    fn test_selling_more_than_held_is_rejected() {
        let (_store, mut book, processor) = setup();
        let untouched = book.clone();
        // EEUU position is worth 2,000,000 * 120 = 240,000,000 on 2022-05-15
        let err = processor
            .process(&mut book, &rebalance(date(2022, 5, 15), dec!(240000001)))
            .unwrap_err();
        match err {
            Error::InsufficientHolding {
                portfolio,
                asset,
                date: day,
                held,
                ..
            } => {
                assert_eq!(portfolio, PORTFOLIO);
                assert_eq!(asset, "EEUU");
                assert_eq!(day, date(2022, 5, 15));
                assert_eq!(held, dec!(2000000));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(book, untouched);
    }

    #[test]
    fn test_selling_entire_position_leaves_zero() {
        let (_store, mut book, processor) = setup();
        let tx = processor
            .process(&mut book, &rebalance(date(2022, 5, 15), dec!(240000000)))
            .unwrap();
        assert_eq!(tx.sell.quantity_after, Decimal::ZERO);
        assert_eq!(
            book.quantity_at("EEUU", date(2022, 6, 1)).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_rounding_shortfall_within_threshold_clamps_to_zero() {
        let store = Arc::new(InMemoryPriceStore::default());
        store
            .insert_prices(&[
                PriceRecord::new("A", inception(), dec!(3)),
                PriceRecord::new("B", inception(), dec!(1)),
                PriceRecord::new("A", date(2022, 3, 1), dec!(3)),
                PriceRecord::new("B", date(2022, 3, 1), dec!(1)),
            ])
            .unwrap();
        let portfolio = crate::portfolio::NewPortfolio::new("P")
            .into_portfolio()
            .unwrap();
        let mut book = PortfolioBook::new(portfolio);
        // Slightly less than the 1/3 unit that $1 buys at $3
        book.initialize_holding("A", inception(), dec!(0.33333333333))
            .unwrap();
        book.initialize_holding("B", inception(), Decimal::ZERO)
            .unwrap();
        let processor = TransactionProcessor::new(store, QUANTITY_THRESHOLD);
        let tx = processor
            .process(
                &mut book,
                &NewTransaction::new("P", "A", "B", date(2022, 3, 1), dec!(1)),
            )
            .unwrap();
        assert_eq!(tx.sell.quantity_after, Decimal::ZERO);
        assert_eq!(tx.sell.quantity_delta, dec!(0.33333333333));
        assert_eq!(tx.buy.quantity_after, dec!(1));
    }

    #[test]
    fn test_transaction_on_inception_date_is_out_of_order() {
        let (_store, mut book, processor) = setup();
        let untouched = book.clone();
        let err = processor
            .process(&mut book, &rebalance(inception(), dec!(1000)))
            .unwrap_err();
        assert_eq!(
            err,
            Error::OutOfOrder {
                portfolio: PORTFOLIO.to_string(),
                asset: "EEUU".to_string(),
                date: inception(),
                last_date: inception(),
            }
        );
        assert_eq!(book, untouched);
    }

    #[test]
    fn test_second_leg_failure_rolls_back_first_leg() {
        let (_store, mut book, processor) = setup();
        // Moves Europa's latest breakpoint to 2022-05-16
        processor
            .process(
                &mut book,
                &NewTransaction::new(PORTFOLIO, "Japón", "Europa", date(2022, 5, 16), dec!(1000)),
            )
            .unwrap();
        let untouched = book.clone();

        // EEUU can append on 2022-05-15, Europa cannot
        let err = processor
            .process(&mut book, &rebalance(date(2022, 5, 15), dec!(1000)))
            .unwrap_err();
        assert!(matches!(err, Error::OutOfOrder { ref asset, .. } if asset == "Europa"));
        assert_eq!(book, untouched);
        assert_eq!(book.timeline("EEUU").unwrap().len(), 1);
        assert_eq!(book.transactions().len(), 1);
    }

    #[test]
    fn test_backdated_transaction_after_later_one_is_rejected() {
        let (_store, mut book, processor) = setup();
        processor
            .process(&mut book, &rebalance(date(2022, 5, 16), dec!(1000)))
            .unwrap();
        let err = processor
            .process(&mut book, &rebalance(date(2022, 5, 15), dec!(1000)))
            .unwrap_err();
        assert!(matches!(err, Error::OutOfOrder { .. }));
    }

    #[test]
    fn test_buy_of_asset_without_timeline_is_uninitialized() {
        let (store, mut book, processor) = setup();
        store
            .insert_prices(&[PriceRecord::new("Asia", date(2022, 5, 15), dec!(10))])
            .unwrap();
        let request = NewTransaction::new(PORTFOLIO, "EEUU", "Asia", date(2022, 5, 15), dec!(10));
        assert_eq!(
            processor.process(&mut book, &request).unwrap_err(),
            Error::UninitializedTimeline {
                portfolio: PORTFOLIO.to_string(),
                asset: "Asia".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_requests_are_rejected_up_front() {
        let (_store, mut book, processor) = setup();
        let zero = rebalance(date(2022, 5, 15), Decimal::ZERO);
        assert_eq!(
            processor.process(&mut book, &zero).unwrap_err(),
            Error::Validation(ValidationError::NonPositiveAmount(Decimal::ZERO))
        );
        let same = NewTransaction::new(PORTFOLIO, "EEUU", "EEUU", date(2022, 5, 15), dec!(1));
        assert_eq!(
            processor.process(&mut book, &same).unwrap_err(),
            Error::Validation(ValidationError::SameAsset("EEUU".to_string()))
        );
        let other = NewTransaction::new("Portfolio 2", "EEUU", "Europa", date(2022, 5, 15), dec!(1));
        assert!(processor.process(&mut book, &other).is_err());
        assert!(book.transactions().is_empty());
    }

    #[test]
    fn test_buy_overflow_is_an_error_and_leaves_book_unchanged() {
        let day = date(2022, 5, 15);
        let store = InMemoryPriceStore::new(DuplicatePricePolicy::Reject);
        let mut records = Vec::new();
        for asset in ["A", "B"] {
            records.push(PriceRecord::new(asset, inception(), dec!(1)));
            records.push(PriceRecord::new(asset, day, dec!(1)));
        }
        store.insert_prices(&records).unwrap();
        let store = Arc::new(store);
        let processor = TransactionProcessor::new(store, QUANTITY_THRESHOLD);

        let huge = Decimal::MAX / dec!(2) + dec!(1000);
        let portfolio = NewPortfolio::new(PORTFOLIO).into_portfolio().unwrap();
        let mut book = PortfolioBook::new(portfolio);
        book.initialize_holding("A", inception(), huge).unwrap();
        book.initialize_holding("B", inception(), huge).unwrap();
        let before = book.clone();

        let request = NewTransaction::new(PORTFOLIO, "A", "B", day, huge);
        assert!(matches!(
            processor.process(&mut book, &request),
            Err(Error::Unexpected(_))
        ));
        assert_eq!(book, before);
        assert_eq!(book.quantity_at("B", day).unwrap(), huge);
    }

    #[test]
    fn test_processing_is_deterministic() {
        let (_store, mut first, processor) = setup();
        let (_store2, mut second, _) = setup();
        let request = rebalance(date(2022, 5, 15), dec!(200000000));
        let a = processor.process(&mut first, &request).unwrap();
        let b = processor.process(&mut second, &request).unwrap();
        assert_eq!(a, b);
        assert_eq!(first, second);
    }
}
