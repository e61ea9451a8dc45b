use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Default initial portfolio value V₀ in dollars (1,000,000,000.00)
pub const DEFAULT_INITIAL_VALUE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Default inception date (year, month, day)
pub const DEFAULT_INITIAL_DATE_YMD: (i32, u32, u32) = (2022, 2, 15);

/// Inclusive window of the reference price sheet
pub const DEFAULT_PRICE_WINDOW_YMD: ((i32, u32, u32), (i32, u32, u32)) =
    ((2022, 2, 15), (2023, 2, 16));

/// Shortfall below which a sell is treated as a full liquidation (1e-8)
pub const QUANTITY_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 8);

/// Allowed drift of initial weights from 1 before a warning is logged (1e-6)
pub const WEIGHT_SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Decimal precision for displayed weights
pub const WEIGHT_DISPLAY_PRECISION: u32 = 6;

pub(crate) fn ymd((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// The default inception date, 2022-02-15.
pub fn default_initial_date() -> NaiveDate {
    ymd(DEFAULT_INITIAL_DATE_YMD)
}
