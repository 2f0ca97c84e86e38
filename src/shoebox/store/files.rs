use crate::error::FileError;
use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

/// A boxed stream of file bytes, ready to be handed to a transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync>>;

/// An opened stored file.
pub struct StoredFile {
    pub name: String,
    pub len: u64,
    pub body: ByteStream,
}

/// Binary files living in a single private directory.
///
/// Knows nothing about the catalog: files are addressed by their stored name
/// only. Copy-in goes through a hidden temporary file that is then linked under
/// its final name, so a stored name never points at a half-written file.
pub struct LocalFileStore {
    root: PathBuf,
    default_ext: String,
    sequence: AtomicU64,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            default_ext: ".jpg".to_string(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Extension used when a suggested name carries none.
    pub fn with_default_ext(mut self, ext: &str) -> Self {
        if ext.starts_with('.') {
            self.default_ext = ext.to_string();
        } else {
            self.default_ext = format!(".{}", ext);
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies `source` into the store under a fresh name derived from
    /// `suggested_name` and returns that name.
    pub async fn persist(&self, source: &Path, suggested_name: &str) -> Result<String, FileError> {
        let copy_failed = |err: io::Error| FileError::CopyFailed {
            path: source.to_path_buf(),
            source: err,
        };

        fs::create_dir_all(&self.root).await.map_err(copy_failed)?;

        let tmp = self.root.join(format!(".incoming-{}.tmp", Uuid::new_v4()));
        if let Err(err) = fs::copy(source, &tmp).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(copy_failed(err));
        }

        let linked = self.link_unique(&tmp, suggested_name).await;
        // Gone already when the rename fallback was taken.
        let _ = fs::remove_file(&tmp).await;

        let name = linked.map_err(copy_failed)?;
        debug!(source = %source.display(), stored_name = %name, "persisted file");
        Ok(name)
    }

    /// Maps a stored name to its absolute location. Does not touch the disk.
    pub fn resolve(&self, stored_name: &str) -> Result<PathBuf, FileError> {
        validate_name(stored_name)?;
        Ok(self.root.join(stored_name))
    }

    /// Deletes a stored file. An already-absent file is reported as `NotFound`.
    pub async fn remove(&self, stored_name: &str) -> Result<(), FileError> {
        let path = self.resolve(stored_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(stored_name, "removed file");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(FileError::NotFound(stored_name.to_string()))
            }
            Err(err) => Err(FileError::RemoveFailed {
                name: stored_name.to_string(),
                source: err,
            }),
        }
    }

    /// Opens a stored file as a byte stream.
    pub async fn open(&self, stored_name: &str) -> Result<StoredFile, FileError> {
        let path = self.resolve(stored_name)?;
        let read_failed = |err: io::Error| {
            if err.kind() == io::ErrorKind::NotFound {
                FileError::NotFound(stored_name.to_string())
            } else {
                FileError::ReadFailed {
                    name: stored_name.to_string(),
                    source: err,
                }
            }
        };

        let file = fs::File::open(&path).await.map_err(read_failed)?;
        let len = file.metadata().await.map_err(read_failed)?.len();

        Ok(StoredFile {
            name: stored_name.to_string(),
            len,
            body: Box::pin(ReaderStream::new(file)),
        })
    }

    /// Names of every stored file, excluding in-progress temporaries.
    pub async fn list_names(&self) -> Result<Vec<String>, FileError> {
        let read_failed = |err: io::Error| FileError::ReadFailed {
            name: self.root.display().to_string(),
            source: err,
        };

        if !fs::try_exists(&self.root).await.map_err(read_failed)? {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await.map_err(read_failed)?;
        while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
            let is_file = entry.file_type().await.map_err(read_failed)?.is_file();
            if let Some(name) = entry.file_name().to_str() {
                if is_file && !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn link_unique(&self, tmp: &Path, suggested_name: &str) -> io::Result<String> {
        loop {
            let name = self.unique_name(suggested_name);
            let target = self.root.join(&name);
            match fs::hard_link(tmp, &target).await {
                Ok(()) => return Ok(name),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(stored_name = %name, "name taken, trying the next one");
                }
                Err(_) => {
                    // No hard links on this filesystem.
                    if fs::try_exists(&target).await? {
                        continue;
                    }
                    fs::rename(tmp, &target).await?;
                    return Ok(name);
                }
            }
        }
    }

    fn unique_name(&self, suggested_name: &str) -> String {
        let suggested = Path::new(suggested_name);
        let stem = suggested
            .file_stem()
            .and_then(|s| s.to_str())
            .map(sanitize)
            .filter(|s| !s.is_empty() && !s.starts_with('.'))
            .unwrap_or_else(|| "asset".to_string());
        let ext = suggested
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", sanitize(e)))
            .unwrap_or_else(|| self.default_ext.clone());
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);

        format!("{}-{}-{}{}", stem, Utc::now().timestamp_millis(), seq, ext)
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn validate_name(name: &str) -> Result<(), FileError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(FileError::InvalidName(name.to_string()));
    }
    Ok(())
}
