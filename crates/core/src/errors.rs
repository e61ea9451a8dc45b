//! Core error types for the valuation engine.
//!
//! Every variant carries the asset, date or portfolio that triggered it so an
//! operator can fix the upstream data instead of chasing a generic failure.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the valuation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No price for asset '{asset}' on {date}")]
    MissingPrice { asset: String, date: NaiveDate },

    #[error(
        "Insufficient holding of '{asset}' in portfolio '{portfolio}' on {date}: held {held}, requested {requested}"
    )]
    InsufficientHolding {
        portfolio: String,
        asset: String,
        date: NaiveDate,
        held: Decimal,
        requested: Decimal,
    },

    #[error(
        "Out-of-order breakpoint for '{asset}' in portfolio '{portfolio}': {date} is not after {last_date}"
    )]
    OutOfOrder {
        portfolio: String,
        asset: String,
        date: NaiveDate,
        last_date: NaiveDate,
    },

    #[error("Holding timeline for '{asset}' in portfolio '{portfolio}' is not initialized")]
    UninitializedTimeline { portfolio: String, asset: String },

    #[error("Holding timeline error: {0}")]
    Timeline(#[from] TimelineError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised by a bare holding timeline.
///
/// A timeline does not know which portfolio or asset it belongs to; callers that
/// do know attach that context with [`TimelineError::into_error`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("Timeline has no breakpoints")]
    Uninitialized,

    #[error("Timeline is already initialized (first breakpoint on {date})")]
    AlreadyInitialized { date: NaiveDate },

    #[error("Breakpoint on {date} is not after the latest breakpoint on {last_date}")]
    OutOfOrder { date: NaiveDate, last_date: NaiveDate },

    #[error("Negative quantity {quantity} on {date}")]
    NegativeQuantity { date: NaiveDate, quantity: Decimal },
}

impl TimelineError {
    /// Lifts a timeline error into the engine error, naming the owning pair.
    pub fn into_error(self, portfolio: &str, asset: &str) -> Error {
        match self {
            TimelineError::Uninitialized => Error::UninitializedTimeline {
                portfolio: portfolio.to_string(),
                asset: asset.to_string(),
            },
            TimelineError::OutOfOrder { date, last_date } => Error::OutOfOrder {
                portfolio: portfolio.to_string(),
                asset: asset.to_string(),
                date,
                last_date,
            },
            other => Error::Timeline(other),
        }
    }
}

/// Validation errors for caller input and ingested data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Price for asset '{asset}' on {date} must be positive, got {price}")]
    NonPositivePrice {
        asset: String,
        date: NaiveDate,
        price: Decimal,
    },

    #[error("Duplicate price for asset '{asset}' on {date}")]
    DuplicatePrice { asset: String, date: NaiveDate },

    #[error("Asset '{0}' already exists")]
    DuplicateAsset(String),

    #[error("Portfolio '{0}' already exists")]
    DuplicatePortfolio(String),

    #[error("Initial weight for '{asset}' in portfolio '{portfolio}' is already set")]
    DuplicateWeight { portfolio: String, asset: String },

    #[error("Initial weight {weight} for '{asset}' in portfolio '{portfolio}' is outside [0, 1]")]
    WeightOutOfRange {
        portfolio: String,
        asset: String,
        weight: Decimal,
    },

    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Transaction sells and buys the same asset '{0}'")]
    SameAsset(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(String),

    #[error("Failed to parse date: {0}")]
    DateParse(String),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateParse(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
