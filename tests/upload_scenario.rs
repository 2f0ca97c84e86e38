//! End-to-end: file store, catalog on disk, synchronizer, and the HTTP
//! transport against a mock endpoint.

use mockito::Matcher;
use shoebox::catalog::Catalog;
use shoebox::model::{Asset, UploadState};
use shoebox::store::files::LocalFileStore;
use shoebox::store::kv::FsKeyValueStore;
use shoebox::sync::{HttpTransport, StartUpload, Synchronizer, UploadOutcome};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

async fn open_catalog(home: &Path) -> (Arc<Catalog>, Arc<LocalFileStore>) {
    let files = Arc::new(LocalFileStore::new(home.join("files")));
    let kv = Arc::new(FsKeyValueStore::new(home.join("catalog")));
    let catalog = Arc::new(Catalog::open(kv, files.clone()).await);
    (catalog, files)
}

fn transport(server: &mockito::ServerGuard) -> Arc<HttpTransport> {
    let endpoint = Url::parse(&format!("{}/media", server.url())).unwrap();
    Arc::new(HttpTransport::new(endpoint, "token-123", Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn captured_photo_is_uploaded_and_stays_uploaded_after_restart() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let source = temp.path().join("img.jpg");
    std::fs::write(&source, b"\xff\xd8\xff\xe0 not really a jpeg").unwrap();

    let mut server = mockito::Server::new_async().await;
    let endpoint = server
        .mock("POST", "/media")
        .match_header("authorization", "Bearer token-123")
        .match_header(
            "content-disposition",
            Matcher::Regex(r"^attachment; filename=photo-\d+-\d+\.jpg$".into()),
        )
        .match_body(Matcher::Regex(r#"name="file""#.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create_async()
        .await;

    let (catalog, files) = open_catalog(&home).await;
    assert!(catalog.list().await.is_empty());

    let stored = files.persist(&source, "photo").await.unwrap();
    let asset = catalog.append(Asset::new(stored)).await.unwrap();
    assert_eq!(asset.upload_state, UploadState::Pending);

    let sync = Synchronizer::new(catalog.clone(), files.clone(), transport(&server));
    let handle = match sync.start_upload(&asset.id).await.unwrap() {
        StartUpload::Started(handle) => handle,
        other => panic!("upload not started: {:?}", other),
    };
    assert_eq!(
        catalog.get(&asset.id).await.unwrap().upload_state,
        UploadState::InFlight
    );
    assert_eq!(handle.wait().await, UploadOutcome::Uploaded);
    endpoint.assert_async().await;

    drop(sync);
    drop(catalog);
    let (reopened, _) = open_catalog(&home).await;
    let loaded = reopened.list().await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, asset.id);
    assert_eq!(loaded[0].upload_state, UploadState::Uploaded);
}

#[tokio::test]
async fn server_error_leaves_asset_failed_until_retried() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("img.jpg");
    std::fs::write(&source, b"pixels").unwrap();

    let mut server = mockito::Server::new_async().await;
    let broken = server
        .mock("POST", "/media")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let (catalog, files) = open_catalog(temp.path()).await;
    let stored = files.persist(&source, "img.jpg").await.unwrap();
    let asset = catalog.append(Asset::new(stored)).await.unwrap();
    let sync = Synchronizer::new(catalog.clone(), files.clone(), transport(&server));

    let StartUpload::Started(handle) = sync.start_upload(&asset.id).await.unwrap() else {
        panic!("upload not started");
    };
    assert!(matches!(handle.wait().await, UploadOutcome::Failed(_)));
    assert_eq!(
        catalog.get(&asset.id).await.unwrap().upload_state,
        UploadState::Failed
    );
    broken.assert_async().await;
    broken.remove_async().await;

    let healthy = server
        .mock("POST", "/media")
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create_async()
        .await;

    let StartUpload::Started(handle) = sync.start_upload(&asset.id).await.unwrap() else {
        panic!("retry not started");
    };
    assert_eq!(handle.wait().await, UploadOutcome::Uploaded);
    healthy.assert_async().await;
}
