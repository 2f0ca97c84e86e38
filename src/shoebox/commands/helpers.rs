use crate::catalog::Catalog;
use crate::error::{Result, ShoeboxError};
use crate::index::{index_assets, AssetSelector, DisplayAsset};
use crate::model::Asset;

pub async fn indexed_assets(catalog: &Catalog) -> Vec<DisplayAsset> {
    index_assets(catalog.list().await)
}

/// Resolves every selector against one snapshot of the catalog, so indexes
/// keep their meaning even if the caller goes on to remove assets.
pub async fn resolve_selectors(
    catalog: &Catalog,
    selectors: &[AssetSelector],
) -> Result<Vec<(AssetSelector, Asset)>> {
    let indexed = indexed_assets(catalog).await;

    selectors
        .iter()
        .map(|sel| {
            indexed
                .iter()
                .find(|da| match sel {
                    AssetSelector::Index(n) => da.index == *n,
                    AssetSelector::Id(id) => da.asset.id == *id,
                })
                .map(|da| (*sel, da.asset.clone()))
                .ok_or_else(|| ShoeboxError::Api(format!("Asset {} not found", sel)))
        })
        .collect()
}
