use crate::capture::Capture;
use crate::catalog::Catalog;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{CaptureError, Result};
use crate::model::Asset;
use crate::store::files::LocalFileStore;
use tracing::warn;

/// Copies a capture into the file store and catalogs it as `Pending`.
///
/// A file is only cataloged once the copy succeeded, and a file whose catalog
/// entry could not be written is removed again.
pub async fn run(catalog: &Catalog, files: &LocalFileStore, capture: Capture) -> Result<CmdResult> {
    if capture.temporary_path.as_os_str().is_empty() {
        return Err(CaptureError::EmptyPath.into());
    }

    let stored_name = files
        .persist(&capture.temporary_path, &capture.suggested_name)
        .await?;

    let asset = match catalog.append(Asset::new(stored_name.clone())).await {
        Ok(asset) => asset,
        Err(err) => {
            if let Err(cleanup) = files.remove(&stored_name).await {
                warn!(stored_name = %stored_name, error = %cleanup, "could not remove uncataloged file");
            }
            return Err(err.into());
        }
    };

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Asset added: {}",
        asset.stored_name
    )));
    Ok(result.with_affected_assets(vec![asset]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Fixture;
    use crate::error::{CatalogError, FileError, ShoeboxError};
    use crate::model::UploadState;

    #[tokio::test]
    async fn adds_pending_asset_at_head() {
        let fx = Fixture::new().await;
        fx.add("older.jpg", b"old").await;

        let source = fx.dir.path().join("img.jpg");
        std::fs::write(&source, b"pixels").unwrap();

        let result = run(&fx.catalog, &fx.files, Capture::new(&source, "photo"))
            .await
            .unwrap();

        let added = &result.affected_assets[0];
        assert_eq!(added.upload_state, UploadState::Pending);
        assert!(added.stored_name.starts_with("photo-"));
        assert_eq!(fx.catalog.list().await[0].id, added.id);

        let stored = fx.files.resolve(&added.stored_name).unwrap();
        assert_eq!(std::fs::read(stored).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn failed_copy_creates_no_entry() {
        let fx = Fixture::new().await;
        let missing = fx.dir.path().join("never-written.jpg");

        let err = run(&fx.catalog, &fx.files, Capture::new(&missing, "photo"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShoeboxError::File(FileError::CopyFailed { .. })
        ));
        assert!(fx.catalog.list().await.is_empty());
    }

    #[tokio::test]
    async fn failed_append_removes_the_copied_file() {
        let fx = Fixture::new().await;
        let source = fx.dir.path().join("img.jpg");
        std::fs::write(&source, b"pixels").unwrap();
        fx.kv.set_simulate_write_error(true);

        let err = run(&fx.catalog, &fx.files, Capture::new(&source, "photo"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShoeboxError::Catalog(CatalogError::PersistFailed(_))
        ));
        assert!(fx.catalog.list().await.is_empty());
        assert!(fx.files.list_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_capture_path_is_rejected() {
        let fx = Fixture::new().await;
        let err = run(&fx.catalog, &fx.files, Capture::new("", "photo"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShoeboxError::Capture(CaptureError::EmptyPath)));
    }
}
