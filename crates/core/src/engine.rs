//! The engine facade: asset and portfolio registry, price store and one
//! lock-guarded book per portfolio.
//!
//! Each portfolio has a single writer at a time. `process_transaction` holds
//! the portfolio's write lock for its whole duration and every query holds
//! the read lock, so a query sees both legs of a transaction or neither.
//! Different portfolios never contend.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;

use crate::assets::{Asset, NewAsset};
use crate::errors::{Error, Result, ValidationError};
use crate::ingestion::{IngestionService, LoadReport, PortfolioDataset};
use crate::portfolio::{
    HoldingQuantity, HoldingTimeline, NewPortfolio, NewTransaction, Portfolio, PortfolioBook,
    Transaction, TransactionProcessor, ValuationPoint, ValuationService, ValuationServiceTrait,
    WeightPoint,
};
use crate::prices::{InMemoryPriceStore, PriceInsertSummary, PriceRecord, PriceStoreTrait};
use crate::settings::EngineSettings;

type SharedBook = Arc<RwLock<PortfolioBook>>;

pub struct PortfolioEngine {
    settings: EngineSettings,
    assets: DashMap<String, Asset>,
    books: DashMap<String, SharedBook>,
    price_store: Arc<dyn PriceStoreTrait>,
    processor: TransactionProcessor,
    valuation_service: Arc<dyn ValuationServiceTrait>,
}

impl PortfolioEngine {
    /// Creates an engine backed by an in-memory price store.
    pub fn new(settings: EngineSettings) -> Result<Self> {
        let store = Arc::new(InMemoryPriceStore::new(settings.duplicate_price_policy));
        Self::with_price_store(settings, store)
    }

    /// Creates an engine over a caller-supplied price store.
    pub fn with_price_store(
        settings: EngineSettings,
        price_store: Arc<dyn PriceStoreTrait>,
    ) -> Result<Self> {
        settings.validate()?;
        let processor = TransactionProcessor::new(price_store.clone(), settings.quantity_threshold);
        let valuation_service = Arc::new(ValuationService::new(price_store.clone()));
        Ok(Self {
            settings,
            assets: DashMap::new(),
            books: DashMap::new(),
            price_store,
            processor,
            valuation_service,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn price_store(&self) -> Arc<dyn PriceStoreTrait> {
        self.price_store.clone()
    }

    /// Seeds assets, portfolios, prices and initial holdings in one call.
    pub fn load_dataset(&self, dataset: PortfolioDataset) -> Result<LoadReport> {
        IngestionService::new(self.settings.clone()).load(self, dataset)
    }

    // --- Assets ---

    pub fn create_asset(&self, new_asset: NewAsset) -> Result<Asset> {
        self.register_asset(new_asset.into_asset()?)
    }

    pub(crate) fn register_asset(&self, asset: Asset) -> Result<Asset> {
        match self.assets.entry(asset.name.clone()) {
            Entry::Occupied(_) => Err(Error::Validation(ValidationError::DuplicateAsset(
                asset.name,
            ))),
            Entry::Vacant(slot) => {
                debug!("Registered asset '{}'", asset.name);
                slot.insert(asset.clone());
                Ok(asset)
            }
        }
    }

    pub fn get_asset(&self, name: &str) -> Result<Asset> {
        self.assets
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(format!("Asset '{}'", name)))
    }

    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    /// All registered assets, sorted by name.
    pub fn list_assets(&self) -> Vec<Asset> {
        let mut assets: Vec<Asset> = self.assets.iter().map(|e| e.value().clone()).collect();
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        assets
    }

    // --- Portfolios ---

    pub fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        self.register_portfolio(new_portfolio.into_portfolio()?)
    }

    pub(crate) fn register_portfolio(&self, portfolio: Portfolio) -> Result<Portfolio> {
        match self.books.entry(portfolio.name.clone()) {
            Entry::Occupied(_) => Err(Error::Validation(ValidationError::DuplicatePortfolio(
                portfolio.name,
            ))),
            Entry::Vacant(slot) => {
                debug!(
                    "Registered portfolio '{}' with {} on {}",
                    portfolio.name, portfolio.initial_value, portfolio.initial_date
                );
                slot.insert(Arc::new(RwLock::new(PortfolioBook::new(portfolio.clone()))));
                Ok(portfolio)
            }
        }
    }

    pub fn get_portfolio(&self, name: &str) -> Result<Portfolio> {
        self.read_book(name, |book| Ok(book.portfolio().clone()))
    }

    pub fn has_portfolio(&self, name: &str) -> bool {
        self.books.contains_key(name)
    }

    /// All registered portfolios, sorted by name.
    pub fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        let books: Vec<SharedBook> = self.books.iter().map(|e| e.value().clone()).collect();
        let mut portfolios = books
            .iter()
            .map(|book| Ok(lock_read(book)?.portfolio().clone()))
            .collect::<Result<Vec<_>>>()?;
        portfolios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(portfolios)
    }

    /// Assets the portfolio has a holding timeline for, sorted.
    pub fn portfolio_assets(&self, portfolio: &str) -> Result<Vec<String>> {
        self.read_book(portfolio, |book| Ok(book.asset_names()))
    }

    /// Whether `portfolio` already has a timeline for `asset`. Unknown
    /// portfolios have none.
    pub fn has_holding(&self, portfolio: &str, asset: &str) -> Result<bool> {
        let book = match self.book(portfolio) {
            Ok(book) => book,
            Err(Error::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let has_asset = lock_read(&book)?.has_asset(asset);
        Ok(has_asset)
    }

    // --- Prices ---

    /// Bulk-inserts prices for registered assets.
    pub fn insert_prices(&self, records: &[PriceRecord]) -> Result<PriceInsertSummary> {
        if let Some(unknown) = records.iter().find(|r| !self.has_asset(&r.asset)) {
            return Err(Error::NotFound(format!(
                "Asset '{}' for price on {}",
                unknown.asset, unknown.date
            )));
        }
        self.price_store.insert_prices(records)
    }

    pub fn price_at(&self, asset: &str, date: NaiveDate) -> Result<Decimal> {
        self.price_store.price_at(asset, date)
    }

    // --- Holdings and transactions ---

    /// Starts the holding timeline of `asset` in `portfolio`.
    pub fn initialize_holding(
        &self,
        portfolio: &str,
        asset: &str,
        date: NaiveDate,
        quantity: Decimal,
    ) -> Result<()> {
        if !self.has_asset(asset) {
            return Err(Error::NotFound(format!("Asset '{}'", asset)));
        }
        self.write_book(portfolio, |book| book.initialize_holding(asset, date, quantity))
    }

    /// Applies a sell/buy pair under the portfolio's write lock.
    pub fn process_transaction(&self, request: &NewTransaction) -> Result<Transaction> {
        self.write_book(&request.portfolio, |book| self.processor.process(book, request))
    }

    /// The portfolio's transaction ledger in date order.
    pub fn list_transactions(&self, portfolio: &str) -> Result<Vec<Transaction>> {
        self.read_book(portfolio, |book| {
            let mut transactions = book.transactions().to_vec();
            transactions.sort_by_key(|tx| tx.date);
            Ok(transactions)
        })
    }

    pub fn quantity_at(&self, portfolio: &str, asset: &str, date: NaiveDate) -> Result<Decimal> {
        self.read_book(portfolio, |book| book.quantity_at(asset, date))
    }

    /// A snapshot of one holding timeline.
    pub fn timeline(&self, portfolio: &str, asset: &str) -> Result<HoldingTimeline> {
        self.read_book(portfolio, |book| {
            book.timeline(asset)
                .cloned()
                .ok_or_else(|| Error::UninitializedTimeline {
                    portfolio: portfolio.to_string(),
                    asset: asset.to_string(),
                })
        })
    }

    pub fn holdings_at(&self, portfolio: &str, date: NaiveDate) -> Result<Vec<HoldingQuantity>> {
        self.read_book(portfolio, |book| book.holdings_at(date))
    }

    // --- Valuation ---

    pub fn value_series(
        &self,
        portfolio: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ValuationPoint>> {
        self.read_book(portfolio, |book| {
            self.valuation_service.value_series(book, start_date, end_date)
        })
    }

    pub fn weights_series(
        &self,
        portfolio: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<WeightPoint>> {
        self.read_book(portfolio, |book| {
            self.valuation_service.weights_series(book, start_date, end_date)
        })
    }

    pub fn valuation_at(&self, portfolio: &str, date: NaiveDate) -> Result<ValuationPoint> {
        self.read_book(portfolio, |book| self.valuation_service.valuation_at(book, date))
    }

    // --- Locking ---

    /// Clones the book handle out of the registry so no shard lock is held
    /// while the book's own lock is taken.
    fn book(&self, portfolio: &str) -> Result<SharedBook> {
        self.books
            .get(portfolio)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(format!("Portfolio '{}'", portfolio)))
    }

    fn read_book<T>(
        &self,
        portfolio: &str,
        f: impl FnOnce(&PortfolioBook) -> Result<T>,
    ) -> Result<T> {
        let book = self.book(portfolio)?;
        let guard = lock_read(&book)?;
        f(&guard)
    }

    fn write_book<T>(
        &self,
        portfolio: &str,
        f: impl FnOnce(&mut PortfolioBook) -> Result<T>,
    ) -> Result<T> {
        let book = self.book(portfolio)?;
        let mut guard = lock_write(&book)?;
        f(&mut guard)
    }
}

fn lock_read(book: &RwLock<PortfolioBook>) -> Result<RwLockReadGuard<'_, PortfolioBook>> {
    book.read()
        .map_err(|_| Error::Unexpected("Portfolio lock poisoned".to_string()))
}

fn lock_write(book: &RwLock<PortfolioBook>) -> Result<RwLockWriteGuard<'_, PortfolioBook>> {
    book.write()
        .map_err(|_| Error::Unexpected("Portfolio lock poisoned".to_string()))
}
