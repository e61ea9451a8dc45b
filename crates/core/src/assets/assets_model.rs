//! Asset domain models.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// An investable asset, identified by its unique name (e.g. "EEUU", "Europa").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    /// Optional symbol/ticker
    pub symbol: Option<String>,
}

/// Input model for registering an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl NewAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Validates the new asset data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.name.trim().chars().count() > 100 {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Asset name '{}' exceeds 100 characters",
                self.name.trim()
            ))));
        }
        Ok(())
    }

    /// Validates and normalizes into an [`Asset`]; blank symbols become `None`.
    pub fn into_asset(self) -> Result<Asset> {
        self.validate()?;
        let symbol = self
            .symbol
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(Asset {
            name: self.name.trim().to_string(),
            symbol,
        })
    }
}
