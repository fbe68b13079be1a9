//! The host's file system facade.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// File store errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Writing a file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store refused the write.
    #[error("write to {path} rejected: {reason}")]
    Rejected { path: Utf8PathBuf, reason: String },
}

/// Options for [`BuildFs::write_file`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Keep the file in memory only; never touch the disk.
    pub in_memory_only: bool,
}

impl WriteOptions {
    /// Options for an in-memory-only write.
    pub fn in_memory() -> Self {
        Self {
            in_memory_only: true,
        }
    }
}

/// File access supplied by the build host.
#[async_trait]
pub trait BuildFs: Send + Sync {
    /// Reads a file in full.
    fn read_file_sync(&self, path: &Utf8Path) -> io::Result<String>;

    /// Writes a file. Later pipeline stages see the content at `path`.
    async fn write_file(
        &self,
        path: &Utf8Path,
        content: &str,
        options: WriteOptions,
    ) -> Result<(), FsError>;
}

/// A file store that overlays in-memory files on the disk.
///
/// Reads prefer in-memory content and fall back to the disk.
#[derive(Debug, Default)]
pub struct InMemoryFs {
    files: Mutex<HashMap<Utf8PathBuf, String>>,
}

impl InMemoryFs {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the in-memory content at `path`.
    pub fn get(&self, path: &Utf8Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    /// Returns true if `path` is held in memory.
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.lock().contains_key(path)
    }

    /// Number of in-memory files.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is held in memory.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Utf8PathBuf, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BuildFs for InMemoryFs {
    fn read_file_sync(&self, path: &Utf8Path) -> io::Result<String> {
        if let Some(content) = self.get(path) {
            return Ok(content);
        }
        std::fs::read_to_string(path)
    }

    async fn write_file(
        &self,
        path: &Utf8Path,
        content: &str,
        options: WriteOptions,
    ) -> Result<(), FsError> {
        if !options.in_memory_only {
            tokio::fs::write(path, content)
                .await
                .map_err(|source| FsError::Write {
                    path: path.to_owned(),
                    source,
                })?;
        }
        self.lock().insert(path.to_owned(), content.to_string());
        Ok(())
    }
}
