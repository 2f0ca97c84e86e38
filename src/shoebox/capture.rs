//! Capture sources: camera, photo library, or anything else that hands over a
//! temporary file. The core only consumes what they produce; a failed capture
//! never reaches the catalog.

use crate::error::CaptureError;
use async_trait::async_trait;
use std::path::PathBuf;

/// A freshly captured image waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub temporary_path: PathBuf,
    pub suggested_name: String,
}

impl Capture {
    pub fn new(temporary_path: impl Into<PathBuf>, suggested_name: impl Into<String>) -> Self {
        Self {
            temporary_path: temporary_path.into(),
            suggested_name: suggested_name.into(),
        }
    }
}

#[async_trait]
pub trait CaptureSource: Send + Sync {
    async fn capture(&self) -> Result<Capture, CaptureError>;
}

/// Picks an existing file from disk, the way a photo library picker would.
pub struct PathCapture {
    path: PathBuf,
    name: Option<String>,
}

impl PathCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[async_trait]
impl CaptureSource for PathCapture {
    async fn capture(&self) -> Result<Capture, CaptureError> {
        if self.path.as_os_str().is_empty() {
            return Err(CaptureError::EmptyPath);
        }
        let is_file = tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(CaptureError::Failed(format!(
                "{} is not a readable file",
                self.path.display()
            )));
        }

        let suggested_name = self
            .name
            .clone()
            .or_else(|| {
                self.path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "photo".to_string());

        Ok(Capture::new(self.path.clone(), suggested_name))
    }
}
