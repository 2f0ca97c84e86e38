//! # API Facade
//!
//! [`ShoeboxApi`] is the single entry point for every shoebox operation,
//! whatever the UI. It owns the shared collaborators (file store, catalog and,
//! when an endpoint is configured, the synchronizer), parses user selectors and
//! dispatches to `commands/*.rs`.
//!
//! It does no terminal I/O and holds no business logic: adding, deleting and
//! uploading are composed in the command modules, which is also where they are
//! tested.

use crate::capture::{Capture, CaptureSource};
use crate::catalog::Catalog;
use crate::commands;
use crate::error::{Result, ShoeboxError};
use crate::index::parse_selectors as parse_index_selectors;
use crate::index::AssetSelector;
use crate::model::UploadState;
use crate::store::files::LocalFileStore;
use crate::sync::Synchronizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const NO_UPLOADS: &str =
    "Uploads are not configured. Set `endpoint` and `api-token` with `shoebox config`";

pub struct ShoeboxApi {
    catalog: Arc<Catalog>,
    files: Arc<LocalFileStore>,
    synchronizer: Option<Synchronizer>,
    config_dir: PathBuf,
}

impl ShoeboxApi {
    pub fn new(catalog: Arc<Catalog>, files: Arc<LocalFileStore>, config_dir: PathBuf) -> Self {
        Self {
            catalog,
            files,
            synchronizer: None,
            config_dir,
        }
    }

    pub fn with_synchronizer(mut self, synchronizer: Synchronizer) -> Self {
        self.synchronizer = Some(synchronizer);
        self
    }

    pub async fn add(&self, capture: Capture) -> Result<commands::CmdResult> {
        commands::add::run(&self.catalog, &self.files, capture).await
    }

    /// Runs a capture and adds what it produced. A failed capture adds nothing.
    pub async fn capture(&self, source: &dyn CaptureSource) -> Result<commands::CmdResult> {
        let capture = source.capture().await?;
        self.add(capture).await
    }

    pub async fn list_assets(&self, state: Option<UploadState>) -> Result<commands::CmdResult> {
        commands::list::run(&self.catalog, state).await
    }

    pub async fn delete_assets<I: AsRef<str>>(&self, indexes: &[I]) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(indexes)?;
        commands::delete::run(&self.catalog, &self.files, &selectors).await
    }

    pub async fn upload_assets<I: AsRef<str>>(&self, indexes: &[I]) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(indexes)?;
        commands::upload::run(&self.catalog, self.synchronizer()?, &selectors).await
    }

    pub async fn upload_all(&self) -> Result<commands::CmdResult> {
        commands::upload::run_all(&self.catalog, self.synchronizer()?).await
    }

    pub async fn asset_paths<I: AsRef<str>>(&self, indexes: &[I]) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(indexes)?;
        commands::paths::run(&self.catalog, &self.files, &selectors).await
    }

    pub async fn doctor(&self) -> Result<commands::CmdResult> {
        commands::doctor::run(&self.catalog, &self.files).await
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.config_dir, action)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn files(&self) -> &Arc<LocalFileStore> {
        &self.files
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn can_upload(&self) -> bool {
        self.synchronizer.is_some()
    }

    fn synchronizer(&self) -> Result<&Synchronizer> {
        self.synchronizer
            .as_ref()
            .ok_or_else(|| ShoeboxError::Config(NO_UPLOADS.to_string()))
    }
}

fn parse_selectors<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<AssetSelector>> {
    parse_index_selectors(inputs).map_err(ShoeboxError::Api)
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::doctor::DoctorReport;
pub use commands::{CmdMessage, CmdResult, MessageLevel};
