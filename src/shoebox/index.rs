//! # Display Indexes
//!
//! Assets are identified by UUIDs, which nobody wants to type. Listings number
//! them instead: `1` is the newest asset, `2` the one before, and so on, following
//! the catalog order. Commands accept those numbers, ranges of them (`2-4`), or
//! a full UUID when a stable reference is needed (scripts, logs).
//!
//! Indexes are positional: deleting or adding an asset shifts them. Always
//! resolve against a fresh listing.

use crate::model::Asset;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayAsset {
    pub index: usize,
    pub asset: Asset,
}

/// A user's reference to one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSelector {
    Index(usize),
    Id(Uuid),
}

impl fmt::Display for AssetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSelector::Index(i) => write!(f, "{}", i),
            AssetSelector::Id(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for AssetSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = Uuid::parse_str(s) {
            return Ok(AssetSelector::Id(id));
        }
        match s.parse::<usize>() {
            Ok(0) => Err("Indexes start at 1".to_string()),
            Ok(n) => Ok(AssetSelector::Index(n)),
            Err(_) => Err(format!("Invalid index format: {}", s)),
        }
    }
}

/// Numbers assets in the order given (the catalog's, newest first).
pub fn index_assets(assets: Vec<Asset>) -> Vec<DisplayAsset> {
    assets
        .into_iter()
        .enumerate()
        .map(|(i, asset)| DisplayAsset {
            index: i + 1,
            asset,
        })
        .collect()
}

/// Parses a single index, a UUID, or an index range like `3-5`.
pub fn parse_selector_or_range(s: &str) -> Result<Vec<AssetSelector>, String> {
    // UUIDs contain dashes too
    if let Ok(id) = Uuid::parse_str(s) {
        return Ok(vec![AssetSelector::Id(id)]);
    }

    if let Some((start, end)) = s.split_once('-') {
        let start = parse_index(start)?;
        let end = parse_index(end)?;
        if start > end {
            return Err(format!(
                "Invalid range: start ({}) must be <= end ({})",
                start, end
            ));
        }
        return Ok((start..=end).map(AssetSelector::Index).collect());
    }

    AssetSelector::from_str(s).map(|sel| vec![sel])
}

/// Parses every input, expanding ranges, keeping order.
pub fn parse_selectors<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<AssetSelector>, String> {
    let mut selectors = Vec::new();
    for input in inputs {
        selectors.extend(parse_selector_or_range(input.as_ref())?);
    }
    Ok(selectors)
}

fn parse_index(s: &str) -> Result<usize, String> {
    match AssetSelector::from_str(s)? {
        AssetSelector::Index(n) => Ok(n),
        AssetSelector::Id(_) => Err(format!("Invalid range bound: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_follow_catalog_order() {
        let assets = vec![
            Asset::new("c.jpg".into()),
            Asset::new("b.jpg".into()),
            Asset::new("a.jpg".into()),
        ];

        let indexed = index_assets(assets);

        assert_eq!(indexed[0].index, 1);
        assert_eq!(indexed[0].asset.stored_name, "c.jpg");
        assert_eq!(indexed[2].index, 3);
        assert_eq!(indexed[2].asset.stored_name, "a.jpg");
    }

    #[test]
    fn test_parsing() {
        assert_eq!(AssetSelector::from_str("1"), Ok(AssetSelector::Index(1)));
        assert_eq!(AssetSelector::from_str("42"), Ok(AssetSelector::Index(42)));

        let id = Uuid::new_v4();
        assert_eq!(
            AssetSelector::from_str(&id.to_string()),
            Ok(AssetSelector::Id(id))
        );

        assert!(AssetSelector::from_str("").is_err());
        assert!(AssetSelector::from_str("0").is_err());
        assert!(AssetSelector::from_str("abc").is_err());
        assert!(AssetSelector::from_str("12a").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_selector_or_range("3-5"),
            Ok(vec![
                AssetSelector::Index(3),
                AssetSelector::Index(4),
                AssetSelector::Index(5)
            ])
        );
        assert_eq!(
            parse_selector_or_range("3-3"),
            Ok(vec![AssetSelector::Index(3)])
        );
    }

    #[test]
    fn test_parse_uuid_is_not_a_range() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_selector_or_range(&id.to_string()),
            Ok(vec![AssetSelector::Id(id)])
        );
    }

    #[test]
    fn test_parse_range_invalid() {
        let result = parse_selector_or_range("5-3");
        assert!(result.unwrap_err().contains("must be <= end"));

        assert!(parse_selector_or_range("-5").is_err());
        assert!(parse_selector_or_range("3-").is_err());
        assert!(parse_selector_or_range("abc-5").is_err());
        assert!(parse_selector_or_range("0-2").is_err());
    }

    #[test]
    fn test_parse_selectors_expands_in_order() {
        assert_eq!(
            parse_selectors(&["4", "1-2"]),
            Ok(vec![
                AssetSelector::Index(4),
                AssetSelector::Index(1),
                AssetSelector::Index(2)
            ])
        );
    }
}
