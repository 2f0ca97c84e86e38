use crate::catalog::Catalog;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Asset;
use crate::store::files::LocalFileStore;
use std::collections::HashSet;

/// Catalog and file store disagreements. Nothing is repaired.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Entries whose file is gone.
    pub missing_files: Vec<Asset>,
    /// Stored files no entry refers to.
    pub untracked_files: Vec<String>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.missing_files.is_empty() && self.untracked_files.is_empty()
    }
}

pub async fn check(catalog: &Catalog, files: &LocalFileStore) -> Result<DoctorReport> {
    let assets = catalog.list().await;
    let stored: HashSet<String> = files.list_names().await?.into_iter().collect();
    let referenced: HashSet<&str> = assets.iter().map(|a| a.stored_name.as_str()).collect();

    let missing_files = assets
        .iter()
        .filter(|a| !stored.contains(&a.stored_name))
        .cloned()
        .collect();

    let mut untracked_files: Vec<String> = stored
        .iter()
        .filter(|name| !referenced.contains(name.as_str()))
        .cloned()
        .collect();
    untracked_files.sort();

    Ok(DoctorReport {
        missing_files,
        untracked_files,
    })
}

pub async fn run(catalog: &Catalog, files: &LocalFileStore) -> Result<CmdResult> {
    let report = check(catalog, files).await?;
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return Ok(result);
    }

    result.add_message(CmdMessage::warning("Inconsistencies found:"));
    if !report.missing_files.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "  - {} asset(s) listed in the catalog but missing from disk:",
            report.missing_files.len()
        )));
        for asset in &report.missing_files {
            result.add_message(CmdMessage::info(format!("      {}", asset.stored_name)));
        }
    }
    if !report.untracked_files.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "  - {} file(s) on disk not in the catalog:",
            report.untracked_files.len()
        )));
        for name in &report.untracked_files {
            result.add_message(CmdMessage::info(format!("      {}", name)));
        }
    }

    Ok(result.with_affected_assets(report.missing_files))
}
