//! Price series module.
//!
//! - [`prices_model`] - price records and insert summaries
//! - [`prices_store`] - the read/append interface the engine depends on
//! - [`memory_store`] - the in-memory store used by the engine and tests
//!
//! Lookups are exact-date only. A missing price is reported to the caller and
//! never filled from a neighbouring date.

mod memory_store;
mod prices_model;
mod prices_store;


pub use memory_store::InMemoryPriceStore;
pub use prices_model::{DailyPriceMap, PriceInsertSummary, PricePoint, PriceRecord};
pub use prices_store::PriceStoreTrait;
