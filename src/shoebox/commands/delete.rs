use crate::catalog::Catalog;
use crate::commands::helpers::resolve_selectors;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{CatalogError, FileError, Result};
use crate::index::AssetSelector;
use crate::store::files::LocalFileStore;
use tracing::{debug, warn};

/// Deletes assets: file first, then the catalog entry.
///
/// If a file cannot be removed the error is returned and its entry stays, so
/// the catalog never forgets a file that still exists. Assets before it in
/// `selectors` are already deleted by then. A file that is already gone does
/// not block removing the entry.
pub async fn run(
    catalog: &Catalog,
    files: &LocalFileStore,
    selectors: &[AssetSelector],
) -> Result<CmdResult> {
    let resolved = resolve_selectors(catalog, selectors).await?;
    let mut result = CmdResult::default();

    for (selector, asset) in resolved {
        match files.remove(&asset.stored_name).await {
            Ok(()) => {}
            Err(FileError::NotFound(name)) => {
                debug!(stored_name = %name, "file already gone");
            }
            Err(err) => return Err(err.into()),
        }

        match catalog.remove(&asset.id).await {
            Ok(removed) => {
                result.add_message(CmdMessage::success(format!(
                    "Asset deleted ({}): {}",
                    selector, removed.stored_name
                )));
                result.affected_assets.push(removed);
            }
            // Listed twice, or removed by someone else meanwhile.
            Err(CatalogError::NotFound(id)) => {
                warn!(id = %id, "asset vanished before removal");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Fixture;
    use crate::error::ShoeboxError;

    #[tokio::test]
    async fn removes_file_and_entry() {
        let fx = Fixture::new().await;
        let keep = fx.add("keep.jpg", b"k").await;
        let gone = fx.add("gone.jpg", b"g").await;

        let result = run(&fx.catalog, &fx.files, &[AssetSelector::Index(1)])
            .await
            .unwrap();

        assert_eq!(result.affected_assets[0].id, gone.id);
        assert!(!fx.files.resolve(&gone.stored_name).unwrap().exists());
        let remaining: Vec<_> = fx.catalog.list().await.into_iter().map(|a| a.id).collect();
        assert_eq!(remaining, vec![keep.id]);
    }

    #[tokio::test]
    async fn indexes_refer_to_the_listing_before_deletion() {
        let fx = Fixture::new().await;
        let a = fx.add("a.jpg", b"a").await;
        fx.add("b.jpg", b"b").await;
        let c = fx.add("c.jpg", b"c").await;

        run(
            &fx.catalog,
            &fx.files,
            &[AssetSelector::Index(1), AssetSelector::Index(3)],
        )
        .await
        .unwrap();

        let remaining: Vec<_> = fx.catalog.list().await.into_iter().map(|x| x.id).collect();
        assert_eq!(remaining.len(), 1);
        assert!(!remaining.contains(&a.id));
        assert!(!remaining.contains(&c.id));
    }

    #[tokio::test]
    async fn missing_file_still_removes_entry() {
        let fx = Fixture::new().await;
        let asset = fx.add("a.jpg", b"a").await;
        std::fs::remove_file(fx.files.resolve(&asset.stored_name).unwrap()).unwrap();

        run(&fx.catalog, &fx.files, &[AssetSelector::Id(asset.id)])
            .await
            .unwrap();

        assert!(fx.catalog.list().await.is_empty());
    }

    #[tokio::test]
    async fn failed_file_removal_keeps_entry() {
        let fx = Fixture::new().await;
        let asset = fx.add("a.jpg", b"a").await;
        // A directory in place of the file cannot be removed with remove_file.
        let path = fx.files.resolve(&asset.stored_name).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner"), b"x").unwrap();

        let err = run(&fx.catalog, &fx.files, &[AssetSelector::Index(1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShoeboxError::File(FileError::RemoveFailed { .. })
        ));
        assert_eq!(fx.catalog.list().await[0].id, asset.id);
    }

    #[tokio::test]
    async fn failed_catalog_write_keeps_entry() {
        let fx = Fixture::new().await;
        let asset = fx.add("a.jpg", b"a").await;
        fx.kv.set_simulate_write_error(true);

        let err = run(&fx.catalog, &fx.files, &[AssetSelector::Index(1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShoeboxError::Catalog(CatalogError::PersistFailed(_))
        ));
        assert_eq!(fx.catalog.list().await[0].id, asset.id);
    }

    #[tokio::test]
    async fn duplicate_selectors_delete_once() {
        let fx = Fixture::new().await;
        let asset = fx.add("a.jpg", b"a").await;

        let result = run(
            &fx.catalog,
            &fx.files,
            &[AssetSelector::Index(1), AssetSelector::Id(asset.id)],
        )
        .await
        .unwrap();

        assert_eq!(result.affected_assets.len(), 1);
        assert!(fx.catalog.list().await.is_empty());
    }
}
