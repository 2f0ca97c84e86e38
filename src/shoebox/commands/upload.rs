use crate::catalog::Catalog;
use crate::commands::helpers::{indexed_assets, resolve_selectors};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::AssetSelector;
use crate::model::Asset;
use crate::sync::{StartUpload, Synchronizer, UploadOutcome};
use futures::future::join_all;

/// Starts uploads for the selected assets and waits for all of them.
///
/// A failed upload is a message, not an error: the asset is left `Failed` and
/// can be started again.
pub async fn run(
    catalog: &Catalog,
    sync: &Synchronizer,
    selectors: &[AssetSelector],
) -> Result<CmdResult> {
    let resolved = resolve_selectors(catalog, selectors).await?;
    let targets = resolved
        .into_iter()
        .map(|(sel, asset)| (sel.to_string(), asset))
        .collect();
    upload(catalog, sync, targets).await
}

/// Uploads every `Pending` or `Failed` asset.
pub async fn run_all(catalog: &Catalog, sync: &Synchronizer) -> Result<CmdResult> {
    let targets: Vec<(String, Asset)> = indexed_assets(catalog)
        .await
        .into_iter()
        .filter(|da| da.asset.upload_state.is_startable())
        .map(|da| (da.index.to_string(), da.asset))
        .collect();

    if targets.is_empty() {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info("Nothing to upload."));
        return Ok(result);
    }
    upload(catalog, sync, targets).await
}

async fn upload(
    catalog: &Catalog,
    sync: &Synchronizer,
    targets: Vec<(String, Asset)>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut running = Vec::new();

    for (label, asset) in targets {
        match sync.start_upload(&asset.id).await {
            Ok(StartUpload::Started(handle)) => running.push((label, asset, handle)),
            Ok(StartUpload::AlreadyInFlight) => result.add_message(CmdMessage::info(format!(
                "Already uploading ({}): {}",
                label, asset.stored_name
            ))),
            Ok(StartUpload::AlreadyUploaded) => result.add_message(CmdMessage::info(format!(
                "Already uploaded ({}): {}",
                label, asset.stored_name
            ))),
            // uploads already started still get waited on and reported
            Err(err) => result.add_message(CmdMessage::error(format!(
                "Upload not started ({}): {}: {}",
                label, asset.stored_name, err
            ))),
        }
    }

    let outcomes = join_all(
        running
            .into_iter()
            .map(|(label, asset, handle)| async move { (label, asset, handle.wait().await) }),
    )
    .await;

    for (label, asset, outcome) in outcomes {
        let message = match &outcome {
            UploadOutcome::Uploaded => {
                CmdMessage::success(format!("Uploaded ({}): {}", label, asset.stored_name))
            }
            UploadOutcome::Failed(reason) => CmdMessage::error(format!(
                "Upload failed ({}): {}: {}",
                label, asset.stored_name, reason
            )),
            UploadOutcome::Discarded => CmdMessage::warning(format!(
                "Asset deleted during upload ({}): {}",
                label, asset.stored_name
            )),
        };
        result.add_message(message);
        if let Some(current) = catalog.get(&asset.id).await {
            result.affected_assets.push(current);
        }
    }

    Ok(result)
}
