//! Tests for asset domain models.

#[cfg(test)]
mod tests {
    use crate::assets::{Asset, NewAsset};
    use crate::errors::{Error, ValidationError};
    use serde_json::json;

    #[test]
    fn test_new_asset_trims_name_and_symbol() {
        let asset = NewAsset::new("  EEUU ")
            .with_symbol(" SPY ")
            .into_asset()
            .unwrap();
        assert_eq!(asset.name, "EEUU");
        assert_eq!(asset.symbol.as_deref(), Some("SPY"));
    }

    #[test]
    fn test_blank_symbol_becomes_none() {
        let asset = NewAsset::new("Europa").with_symbol("   ").into_asset().unwrap();
        assert_eq!(asset.symbol, None);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = NewAsset::new("   ").into_asset().unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::MissingField("name".to_string()))
        );
    }

    #[test]
    fn test_overlong_name_is_rejected() {
        let name = "x".repeat(101);
        assert!(NewAsset::new(name).validate().is_err());
    }

    #[test]
    fn test_asset_serialization() {
        let asset = Asset {
            name: "Japón".to_string(),
            symbol: None,
        };
        assert_eq!(
            serde_json::to_value(&asset).unwrap(),
            json!({ "name": "Japón", "symbol": null })
        );
    }

    #[test]
    fn test_new_asset_deserialization_without_symbol() {
        let new_asset: NewAsset = serde_json::from_value(json!({ "name": "EEUU" })).unwrap();
        assert_eq!(new_asset.symbol, None);
    }
}
