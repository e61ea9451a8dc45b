//! Portval Core - portfolio valuation engine.
//!
//! Prices per asset, append-only holding timelines per (portfolio, asset),
//! sell/buy transactions that keep portfolio value constant, and valuation
//! of any date range on demand. The crate does no I/O; the surrounding
//! system supplies data through [`PortfolioEngine`] or a custom
//! [`PriceStoreTrait`] implementation.

pub mod assets;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod ingestion;
pub mod portfolio;
pub mod prices;
pub mod settings;


// Re-export common types
pub use assets::*;
pub use engine::PortfolioEngine;
pub use ingestion::{IngestionService, LoadReport, PortfolioDataset};
pub use portfolio::*;
pub use prices::*;
pub use settings::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
