//! Storage backends for uploaded files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Unified error type for storage operations that handler code can surface
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem operation failure, annotated with what was attempted where
    #[error("failed to {operation} {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type alias for storage operation results
pub type Result<T> = std::result::Result<T, StorageError>;

/// Trait for upload storage backends
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `content` under `<file_id>.<extension>` and return the path written
    async fn store(&self, file_id: Uuid, extension: &str, content: &[u8]) -> Result<PathBuf>;
}

/// Local filesystem storage backend - writes every upload into a single directory
pub struct LocalFileStore {
    upload_folder: PathBuf,
}

impl LocalFileStore {
    pub fn new(upload_folder: PathBuf) -> Self {
        Self { upload_folder }
    }
}

fn io_err(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io { operation, path, source }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, file_id: Uuid, extension: &str, content: &[u8]) -> Result<PathBuf> {
        // Runs on every upload: a no-op when the directory already exists, and
        // concurrent uploads racing to create it all succeed.
        fs::create_dir_all(&self.upload_folder)
            .await
            .map_err(io_err("create directory", &self.upload_folder))?;

        let path = self.upload_folder.join(format!("{file_id}.{extension}"));

        let mut file = fs::File::create(&path).await.map_err(io_err("create", &path))?;
        file.write_all(content).await.map_err(io_err("write", &path))?;
        file.sync_all().await.map_err(io_err("sync", &path))?;

        Ok(path)
    }
}
