use super::events::{NoopNotifier, UploadEvent, UploadNotifier, UploadOutcome};
use super::transport::{content_type_for, UploadRequest, UploadTransport};
use crate::catalog::{BeginUpload, Catalog};
use crate::error::{CatalogError, FileError, TransportError};
use crate::model::{Asset, UploadState};
use crate::store::files::LocalFileStore;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Automatic retries inside a single `InFlight` period.
///
/// `attempts` is the number of extra tries after the first failure; the wait
/// doubles each time starting from `backoff`. Zero attempts (the default) means
/// a failed upload stays `Failed` until someone starts it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn manual() -> Self {
        Self {
            attempts: 0,
            backoff: Duration::from_millis(500),
        }
    }

    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::manual()
    }
}

/// What `start_upload` did.
#[derive(Debug)]
pub enum StartUpload {
    Started(UploadHandle),
    /// Another attempt is running; nothing was started.
    AlreadyInFlight,
    /// Terminal state; uploads are never repeated automatically.
    AlreadyUploaded,
}

/// A running upload. Dropping the handle does not cancel it.
#[derive(Debug)]
pub struct UploadHandle {
    id: Uuid,
    task: JoinHandle<UploadOutcome>,
}

impl UploadHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn wait(self) -> UploadOutcome {
        self.task
            .await
            .unwrap_or_else(|err| UploadOutcome::Failed(format!("Upload task aborted: {}", err)))
    }
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Drives assets through the upload state machine.
///
/// Holds no state of its own: every transition is written to the catalog. The
/// catalog's `begin_upload` makes the check and the move to `InFlight` one
/// step, which is what keeps a second start request from reaching the
/// transport.
#[derive(Clone)]
pub struct Synchronizer {
    catalog: Arc<Catalog>,
    files: Arc<LocalFileStore>,
    transport: Arc<dyn UploadTransport>,
    notifier: Arc<dyn UploadNotifier>,
    retry: RetryPolicy,
}

impl Synchronizer {
    pub fn new(
        catalog: Arc<Catalog>,
        files: Arc<LocalFileStore>,
        transport: Arc<dyn UploadTransport>,
    ) -> Self {
        Self {
            catalog,
            files,
            transport,
            notifier: Arc::new(NoopNotifier),
            retry: RetryPolicy::manual(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn UploadNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Moves the asset to `InFlight` and uploads it in the background.
    ///
    /// Returns as soon as the transition is recorded. Starting an asset that
    /// is already uploading or uploaded is a no-op, not an error.
    pub async fn start_upload(&self, id: &Uuid) -> Result<StartUpload, CatalogError> {
        let asset = match self.catalog.begin_upload(id).await? {
            BeginUpload::Started(asset) => asset,
            BeginUpload::AlreadyInFlight => {
                debug!(id = %id, "upload already running");
                return Ok(StartUpload::AlreadyInFlight);
            }
            BeginUpload::AlreadyUploaded => {
                debug!(id = %id, "asset already uploaded");
                return Ok(StartUpload::AlreadyUploaded);
            }
        };

        self.notifier.notify(UploadEvent::Started {
            id: asset.id,
            stored_name: asset.stored_name.clone(),
        });

        let this = self.clone();
        let task = tokio::spawn(async move { this.run(asset).await });
        Ok(StartUpload::Started(UploadHandle { id: *id, task }))
    }

    async fn run(self, asset: Asset) -> UploadOutcome {
        let (state, outcome) = match self.attempt_with_retry(&asset).await {
            Ok(()) => (UploadState::Uploaded, UploadOutcome::Uploaded),
            Err(err) => {
                warn!(id = %asset.id, error = %err, "upload failed");
                (UploadState::Failed, UploadOutcome::Failed(err.to_string()))
            }
        };

        let outcome = match self.catalog.update_state(&asset.id, state).await {
            Ok(_) => outcome,
            Err(CatalogError::NotFound(_)) => {
                info!(id = %asset.id, "asset deleted during upload, dropping result");
                UploadOutcome::Discarded
            }
            Err(err) => {
                error!(id = %asset.id, error = %err, "could not record upload result");
                self.catalog.abandon_upload(&asset.id).await;
                UploadOutcome::Failed(format!("Upload result not saved: {}", err))
            }
        };

        self.notifier.notify(UploadEvent::Finished {
            id: asset.id,
            outcome: outcome.clone(),
        });
        outcome
    }

    async fn attempt_with_retry(&self, asset: &Asset) -> Result<(), AttemptError> {
        let mut retry = 0;
        loop {
            match self.attempt(asset).await {
                Err(AttemptError::Transport(err)) if retry < self.retry.attempts => {
                    let delay = self.retry.delay(retry);
                    warn!(id = %asset.id, error = %err, retry = retry + 1, ?delay, "upload attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                result => return result,
            }
        }
    }

    async fn attempt(&self, asset: &Asset) -> Result<(), AttemptError> {
        let file = self.files.open(&asset.stored_name).await?;
        let request = UploadRequest {
            content_type: content_type_for(&file.name).to_string(),
            file_name: file.name,
            len: file.len,
            body: file.body,
        };
        self.transport.upload(request).await?;
        Ok(())
    }
}
