use crate::model::UploadState;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Failures at the local file boundary. Always recoverable by retrying or
/// reporting to the user.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to copy {} into the file store: {source}", .path.display())]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored file not found: {0}")]
    NotFound(String),

    #[error("Failed to remove stored file {name}: {source}")]
    RemoveFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read stored file {name}: {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid stored name: {0:?}")]
    InvalidName(String),
}

/// Failures of the durable key-value store.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to persist catalog: {0}")]
    PersistFailed(#[source] KvError),

    #[error("Asset not found: {0}")]
    NotFound(Uuid),

    #[error("Asset {id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: Uuid,
        from: UploadState,
        to: UploadState,
    },
}

/// Failures talking to the remote endpoint. These never escape the
/// synchronizer; they become the `Failed` upload state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture produced no file")]
    EmptyPath,

    #[error("Capture failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum ShoeboxError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, ShoeboxError>;
