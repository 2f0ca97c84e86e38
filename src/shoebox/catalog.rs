//! # Asset Catalog
//!
//! The durable, ordered list of every [`Asset`] and the single source of truth
//! for upload state.
//!
//! ## Persistence
//!
//! The whole list is serialized as one JSON array under [`CATALOG_KEY`] and
//! rewritten on every mutation. The key-value store guarantees atomic per-key
//! writes, so the persisted list is always some complete version of the catalog.
//!
//! Every mutation works on a copy of the in-memory list, persists the copy, and
//! only then swaps it in. A failed write therefore leaves the in-memory view
//! exactly as it was (`CatalogError::PersistFailed`).
//!
//! All mutations go through one async mutex: concurrent callers are serialized
//! and the last writer wins at whole-list granularity.
//!
//! ## Ordering
//!
//! Most recently created first. `append` puts the new asset at the head; loaded
//! entries keep their persisted order.
//!
//! ## Loading is lenient
//!
//! A missing, unreadable or corrupt catalog loads as an **empty** catalog. This
//! trades possible data loss in the index for always being able to start; the
//! image files themselves stay untouched in the file store.
//!
//! Two fix-ups happen on load:
//! - An asset persisted as `InFlight` cannot still be uploading after a restart,
//!   so it comes back as `Failed` and can be retried.
//! - Earlier releases stored a bare array of filenames (oldest first) and no
//!   upload state. Such a list is read as `Pending` assets, newest first.

use crate::error::{CatalogError, KvError};
use crate::model::{Asset, UploadState};
use crate::store::files::LocalFileStore;
use crate::store::kv::KeyValueStore;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Durable key holding the serialized asset list.
pub const CATALOG_KEY: &str = "assets";

/// Result of trying to move an asset into `InFlight`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginUpload {
    /// The asset is now `InFlight`; the caller owns the attempt.
    Started(Asset),
    AlreadyInFlight,
    AlreadyUploaded,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Record(Asset),
    LegacyName(String),
}

pub struct Catalog {
    kv: Arc<dyn KeyValueStore>,
    files: Arc<LocalFileStore>,
    assets: Mutex<Vec<Asset>>,
}

impl Catalog {
    /// Builds a catalog and loads whatever is persisted.
    pub async fn open(kv: Arc<dyn KeyValueStore>, files: Arc<LocalFileStore>) -> Self {
        let catalog = Self {
            kv,
            files,
            assets: Mutex::new(Vec::new()),
        };
        catalog.load().await;
        catalog
    }

    /// Re-reads the persisted list, replacing the in-memory view.
    pub async fn load(&self) -> Vec<Asset> {
        let mut assets = self.assets.lock().await;
        *assets = self.read_persisted().await;
        debug!(count = assets.len(), "catalog loaded");
        assets.clone()
    }

    pub async fn list(&self) -> Vec<Asset> {
        self.assets.lock().await.clone()
    }

    pub async fn get(&self, id: &Uuid) -> Option<Asset> {
        self.assets
            .lock()
            .await
            .iter()
            .find(|a| a.id == *id)
            .cloned()
    }

    /// Adds a new asset at the head of the list, in state `Pending`.
    pub async fn append(&self, mut asset: Asset) -> Result<Asset, CatalogError> {
        asset.upload_state = UploadState::Pending;
        asset.display_path = self.display_path(&asset.stored_name);

        let mut assets = self.assets.lock().await;
        let mut next = assets.clone();
        next.insert(0, asset.clone());
        self.persist(&next).await?;
        *assets = next;

        info!(id = %asset.id, stored_name = %asset.stored_name, "asset added");
        Ok(asset)
    }

    /// Applies one upload state transition and persists it.
    pub async fn update_state(
        &self,
        id: &Uuid,
        new_state: UploadState,
    ) -> Result<Asset, CatalogError> {
        let mut assets = self.assets.lock().await;
        let mut next = assets.clone();
        let asset = next
            .iter_mut()
            .find(|a| a.id == *id)
            .ok_or(CatalogError::NotFound(*id))?;

        let from = asset.upload_state;
        if !from.can_transition_to(new_state) {
            return Err(CatalogError::IllegalTransition {
                id: *id,
                from,
                to: new_state,
            });
        }
        asset.upload_state = new_state;
        let updated = asset.clone();

        self.persist(&next).await?;
        *assets = next;

        info!(id = %id, %from, to = %new_state, "upload state changed");
        Ok(updated)
    }

    /// Moves a `Pending` or `Failed` asset to `InFlight`, unless an upload is
    /// already running or done. Check and transition happen under one lock.
    pub async fn begin_upload(&self, id: &Uuid) -> Result<BeginUpload, CatalogError> {
        let mut assets = self.assets.lock().await;
        let position = assets
            .iter()
            .position(|a| a.id == *id)
            .ok_or(CatalogError::NotFound(*id))?;

        let current = assets[position].upload_state;
        match current {
            UploadState::InFlight => return Ok(BeginUpload::AlreadyInFlight),
            UploadState::Uploaded => return Ok(BeginUpload::AlreadyUploaded),
            UploadState::Pending | UploadState::Failed => {}
        }

        let mut next = assets.clone();
        next[position].upload_state = UploadState::InFlight;
        let started = next[position].clone();
        self.persist(&next).await?;
        *assets = next;

        info!(id = %id, from = %current, "upload started");
        Ok(BeginUpload::Started(started))
    }

    /// Marks an `InFlight` asset `Failed` after its result could not be
    /// recorded, so it can be started again.
    ///
    /// The in-memory state changes even if this write fails too: the stored
    /// `InFlight` already loads as `Failed`, so both views agree.
    pub async fn abandon_upload(&self, id: &Uuid) -> Option<Asset> {
        let mut assets = self.assets.lock().await;
        let position = assets
            .iter()
            .position(|a| a.id == *id && a.upload_state == UploadState::InFlight)?;

        let mut next = assets.clone();
        next[position].upload_state = UploadState::Failed;
        if let Err(err) = self.persist(&next).await {
            warn!(id = %id, error = %err, "abandoned upload not persisted");
        }
        *assets = next;

        info!(id = %id, "upload abandoned");
        Some(assets[position].clone())
    }

    /// Drops the entry. The backing file is the caller's business.
    pub async fn remove(&self, id: &Uuid) -> Result<Asset, CatalogError> {
        let mut assets = self.assets.lock().await;
        let position = assets
            .iter()
            .position(|a| a.id == *id)
            .ok_or(CatalogError::NotFound(*id))?;

        let mut next = assets.clone();
        let removed = next.remove(position);
        self.persist(&next).await?;
        *assets = next;

        info!(id = %id, stored_name = %removed.stored_name, "asset removed from catalog");
        Ok(removed)
    }

    async fn persist(&self, assets: &[Asset]) -> Result<(), CatalogError> {
        let content = serde_json::to_string_pretty(assets)
            .map_err(|e| CatalogError::PersistFailed(KvError::Backend(e.to_string())))?;
        self.kv
            .set(CATALOG_KEY, content)
            .await
            .map_err(CatalogError::PersistFailed)
    }

    async fn read_persisted(&self) -> Vec<Asset> {
        let raw = match self.kv.get(CATALOG_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "catalog unreadable, starting with an empty catalog");
                return Vec::new();
            }
        };

        let entries: Vec<StoredEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "catalog corrupt, starting with an empty catalog");
                return Vec::new();
            }
        };

        let legacy = !entries.is_empty()
            && entries
                .iter()
                .all(|e| matches!(e, StoredEntry::LegacyName(_)));

        let mut assets: Vec<Asset> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                StoredEntry::Record(asset) => Some(asset),
                StoredEntry::LegacyName(name) => {
                    if self.files.resolve(&name).is_err() {
                        warn!(stored_name = %name, "skipping legacy entry with invalid name");
                        return None;
                    }
                    Some(Asset::new(name))
                }
            })
            .collect();

        if legacy {
            assets.reverse();
        }

        for asset in assets.iter_mut() {
            if asset.upload_state == UploadState::InFlight {
                info!(id = %asset.id, "interrupted upload marked as failed");
                asset.upload_state = UploadState::Failed;
            }
            asset.display_path = self.display_path(&asset.stored_name);
        }
        assets
    }

    fn display_path(&self, stored_name: &str) -> String {
        match self.files.resolve(stored_name) {
            Ok(path) => Url::from_file_path(&path)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| path.display().to_string()),
            Err(_) => String::new(),
        }
    }
}
