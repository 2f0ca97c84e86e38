use crate::catalog::Catalog;
use crate::commands::helpers::resolve_selectors;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::index::AssetSelector;
use crate::store::files::LocalFileStore;

pub async fn run(
    catalog: &Catalog,
    files: &LocalFileStore,
    selectors: &[AssetSelector],
) -> Result<CmdResult> {
    let resolved = resolve_selectors(catalog, selectors).await?;
    let mut paths = Vec::with_capacity(resolved.len());

    for (_, asset) in resolved {
        paths.push(files.resolve(&asset.stored_name)?);
    }

    Ok(CmdResult::default().with_asset_paths(paths))
}
