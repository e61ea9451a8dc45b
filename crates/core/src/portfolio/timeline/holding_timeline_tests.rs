#[cfg(test)]
mod tests {
    use crate::errors::TimelineError;
    use crate::portfolio::timeline::{Breakpoint, HoldingTimeline};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timeline_with_transaction() -> HoldingTimeline {
        let mut timeline = HoldingTimeline::new();
        timeline
            .initialize(date(2022, 2, 15), dec!(2000000))
            .unwrap();
        timeline
            .append_breakpoint(date(2022, 5, 15), dec!(333333.33))
            .unwrap();
        timeline
    }

    #[test]
    fn test_uninitialized_timeline_errors_on_query() {
        let timeline = HoldingTimeline::new();
        assert_eq!(
            timeline.quantity_at(date(2022, 2, 15)),
            Err(TimelineError::Uninitialized)
        );
        assert!(!timeline.is_initialized());
    }

    #[test]
    fn test_quantity_before_first_breakpoint_is_zero() {
        let timeline = timeline_with_transaction();
        assert_eq!(timeline.quantity_at(date(2022, 2, 14)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_on_breakpoint_date_is_inclusive() {
        let timeline = timeline_with_transaction();
        assert_eq!(
            timeline.quantity_at(date(2022, 2, 15)).unwrap(),
            dec!(2000000)
        );
        assert_eq!(
            timeline.quantity_at(date(2022, 5, 15)).unwrap(),
            dec!(333333.33)
        );
    }

    #[test]
    fn test_quantity_between_and_after_breakpoints() {
        let timeline = timeline_with_transaction();
        assert_eq!(
            timeline.quantity_at(date(2022, 5, 14)).unwrap(),
            dec!(2000000)
        );
        assert_eq!(
            timeline.quantity_at(date(2022, 5, 16)).unwrap(),
            dec!(333333.33)
        );
        assert_eq!(
            timeline.quantity_at(date(2030, 1, 1)).unwrap(),
            dec!(333333.33)
        );
    }

    #[test]
    fn test_initialize_twice_fails() {
        let mut timeline = timeline_with_transaction();
        assert_eq!(
            timeline.initialize(date(2023, 1, 1), dec!(1)),
            Err(TimelineError::AlreadyInitialized {
                date: date(2022, 2, 15)
            })
        );
    }

    #[test]
    fn test_append_on_or_before_last_date_is_out_of_order() {
        let mut timeline = timeline_with_transaction();
        assert_eq!(
            timeline.append_breakpoint(date(2022, 5, 15), dec!(1)),
            Err(TimelineError::OutOfOrder {
                date: date(2022, 5, 15),
                last_date: date(2022, 5, 15),
            })
        );
        assert!(timeline
            .append_breakpoint(date(2022, 3, 1), dec!(1))
            .is_err());
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_append_before_initialize_fails() {
        let mut timeline = HoldingTimeline::new();
        assert_eq!(
            timeline.append_breakpoint(date(2022, 5, 15), dec!(1)),
            Err(TimelineError::Uninitialized)
        );
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let mut timeline = timeline_with_transaction();
        assert!(matches!(
            timeline.append_breakpoint(date(2022, 6, 1), dec!(-0.5)),
            Err(TimelineError::NegativeQuantity { .. })
        ));
        let mut fresh = HoldingTimeline::new();
        assert!(fresh.initialize(date(2022, 2, 15), dec!(-1)).is_err());
    }

    #[test]
    fn test_zero_quantity_breakpoint_is_allowed() {
        let mut timeline = timeline_with_transaction();
        timeline
            .append_breakpoint(date(2022, 6, 1), Decimal::ZERO)
            .unwrap();
        assert_eq!(timeline.quantity_at(date(2022, 6, 2)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_rollback_never_removes_initial_breakpoint() {
        let mut timeline = timeline_with_transaction();
        assert_eq!(
            timeline.rollback_last(),
            Some(Breakpoint::new(date(2022, 5, 15), dec!(333333.33)))
        );
        assert_eq!(timeline.rollback_last(), None);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_from_breakpoints_revalidates_order() {
        let ok = HoldingTimeline::from_breakpoints(vec![
            Breakpoint::new(date(2022, 2, 15), dec!(10)),
            Breakpoint::new(date(2022, 3, 1), dec!(5)),
        ])
        .unwrap();
        assert_eq!(ok.last_date(), Some(date(2022, 3, 1)));
        assert_eq!(ok.latest_quantity(), Some(dec!(5)));

        let err = HoldingTimeline::from_breakpoints(vec![
            Breakpoint::new(date(2022, 3, 1), dec!(10)),
            Breakpoint::new(date(2022, 2, 15), dec!(5)),
        ]);
        assert!(matches!(err, Err(TimelineError::OutOfOrder { .. })));
    }

    #[test]
    fn test_serializes_breakpoints_in_order() {
        let timeline = timeline_with_transaction();
        let json = serde_json::to_value(&timeline).unwrap();
        let breakpoints = json["breakpoints"].as_array().unwrap();
        assert_eq!(breakpoints.len(), 2);
        assert_eq!(breakpoints[0]["effectiveDate"], "2022-02-15");
        assert_eq!(breakpoints[1]["quantity"], "333333.33");
    }
}
