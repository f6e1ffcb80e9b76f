//! Test utilities for integration testing (available with `test-utils` feature).

use crate::AppState;
use crate::config::Config;
use crate::storage::{self, FileStore, LocalFileStore};
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Build a configuration suitable for tests, storing uploads under `upload_folder`.
///
/// Callers typically pass a [`tempfile::tempdir`] path and tweak individual fields
/// afterwards (size limit, allow-list) for the case under test.
pub fn create_test_config(upload_folder: &Path) -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    };
    config.ocr.upload_folder = upload_folder.to_path_buf();
    config
}

/// Create a test server backed by a local file store rooted at the configured folder.
pub fn create_test_app(config: Config) -> TestServer {
    let storage: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(config.ocr.upload_folder.clone()));
    create_test_app_with_store(config, storage)
}

/// Create a test server with an explicit file store implementation.
pub fn create_test_app_with_store(config: Config, storage: Arc<dyn FileStore>) -> TestServer {
    let state = AppState::builder().config(config).storage(storage).build();
    let router = crate::build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// A file store whose every operation fails. Useful for exercising error paths.
pub struct FailingFileStore;

#[async_trait::async_trait]
impl FileStore for FailingFileStore {
    async fn store(&self, _file_id: Uuid, _extension: &str, _content: &[u8]) -> storage::Result<PathBuf> {
        Err(storage::StorageError::Other(anyhow::anyhow!(
            "FailingFileStore: simulated storage failure"
        )))
    }
}
