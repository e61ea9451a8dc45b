use serde::{Deserialize, Serialize};

use crate::assets::NewAsset;
use crate::portfolio::{InitialWeight, NewPortfolio};
use crate::prices::{PriceInsertSummary, PriceRecord};

/// Everything needed to seed the engine in one call.
///
/// `assets` and `portfolios` may be left empty, in which case they are derived
/// from the names used in `weights` (portfolios then take the default initial
/// value and date).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDataset {
    #[serde(default)]
    pub assets: Vec<NewAsset>,
    #[serde(default)]
    pub portfolios: Vec<NewPortfolio>,
    #[serde(default)]
    pub weights: Vec<InitialWeight>,
    #[serde(default)]
    pub prices: Vec<PriceRecord>,
}

impl PortfolioDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(mut self, assets: Vec<NewAsset>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_portfolios(mut self, portfolios: Vec<NewPortfolio>) -> Self {
        self.portfolios = portfolios;
        self
    }

    pub fn with_weights(mut self, weights: Vec<InitialWeight>) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_prices(mut self, prices: Vec<PriceRecord>) -> Self {
        self.prices = prices;
        self
    }
}

/// What a load changed, and which price rows it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub assets_created: usize,
    pub portfolios_created: usize,
    pub holdings_initialized: usize,
    pub prices: PriceInsertSummary,
    /// Rows dated outside the configured price window
    pub prices_skipped_outside_window: usize,
    /// Rows for assets that are not registered
    pub prices_skipped_unknown_asset: usize,
}

impl LoadReport {
    pub fn prices_skipped(&self) -> usize {
        self.prices_skipped_outside_window + self.prices_skipped_unknown_asset
    }
}
