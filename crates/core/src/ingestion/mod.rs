//! Bulk loading of assets, portfolios, initial weights and prices.

mod ingestion_model;
mod ingestion_service;


pub use ingestion_model::{LoadReport, PortfolioDataset};
pub use ingestion_service::IngestionService;
