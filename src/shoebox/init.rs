use crate::api::ShoeboxApi;
use crate::catalog::Catalog;
use crate::config::ShoeboxConfig;
use crate::error::{Result, ShoeboxError};
use crate::store::files::LocalFileStore;
use crate::store::kv::FsKeyValueStore;
use crate::sync::{HttpTransport, Synchronizer};
use directories::ProjectDirs;
use fs4::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Overrides the data directory.
pub const HOME_ENV: &str = "SHOEBOX_HOME";

const CATALOG_DIR: &str = "catalog";
const FILES_DIR: &str = "files";
const LOCK_FILE: &str = ".lock";

/// Everything a command needs. Holds the data directory lock until dropped,
/// so only one context per `home` exists at a time, across processes.
pub struct ShoeboxContext {
    pub api: ShoeboxApi,
    pub config: ShoeboxConfig,
    pub home: PathBuf,
    _lock: File,
}

/// `$SHOEBOX_HOME`, or the platform data directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "shoebox", "shoebox")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ShoeboxError::Config("Could not determine data directory".to_string()))
}

/// Wires the stores, catalog and (if configured) synchronizer under `home`.
///
/// ```text
/// <home>/
/// ├── .lock
/// ├── config.json
/// ├── catalog/assets.json
/// └── files/
/// ```
///
/// Waits while another process holds `home`. The catalog is only loaded once
/// the lock is taken, so it never starts from a stale copy.
pub async fn initialize(home: &Path) -> Result<ShoeboxContext> {
    let lock = lock_home(home).await?;

    let config = match ShoeboxConfig::load(home) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "config unreadable, using defaults");
            ShoeboxConfig::default()
        }
    }
    .with_env_overrides();

    let files = Arc::new(LocalFileStore::new(home.join(FILES_DIR)).with_default_ext(&config.file_ext));
    let kv = Arc::new(FsKeyValueStore::new(home.join(CATALOG_DIR)));
    let catalog = Arc::new(Catalog::open(kv, files.clone()).await);

    let mut api = ShoeboxApi::new(catalog.clone(), files.clone(), home.to_path_buf());
    if let Some(sync) = build_synchronizer(&config, catalog, files) {
        api = api.with_synchronizer(sync);
    }

    Ok(ShoeboxContext {
        api,
        config,
        home: home.to_path_buf(),
        _lock: lock,
    })
}

/// Takes an exclusive advisory lock on `<home>/.lock`.
async fn lock_home(home: &Path) -> Result<File> {
    fs::create_dir_all(home)?;
    let path = home.join(LOCK_FILE);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)?;

    if file.try_lock_exclusive().is_ok() {
        debug!(path = %path.display(), "data directory locked");
        return Ok(file);
    }

    warn!(path = %path.display(), "data directory in use, waiting for the other shoebox process");
    tokio::task::spawn_blocking(move || file.lock_exclusive().map(|()| file))
        .await
        .map_err(|e| ShoeboxError::Io(io::Error::other(e)))?
        .map_err(ShoeboxError::Io)
}

/// A synchronizer over HTTP, when both endpoint and token are usable.
pub fn build_synchronizer(
    config: &ShoeboxConfig,
    catalog: Arc<Catalog>,
    files: Arc<LocalFileStore>,
) -> Option<Synchronizer> {
    let endpoint = match config.endpoint_url() {
        Ok(Some(url)) => url,
        Ok(None) => return None,
        Err(err) => {
            warn!(error = %err, "uploads disabled");
            return None;
        }
    };
    let Some(token) = config.api_token.clone() else {
        warn!("endpoint configured without api-token, uploads disabled");
        return None;
    };

    match HttpTransport::new(endpoint, token, config.timeout()) {
        Ok(transport) => Some(
            Synchronizer::new(catalog, files, Arc::new(transport))
                .with_retry(config.retry_policy()),
        ),
        Err(err) => {
            warn!(error = %err, "could not build HTTP client, uploads disabled");
            None
        }
    }
}
