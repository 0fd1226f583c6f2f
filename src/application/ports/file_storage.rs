use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::value_objects::DocumentId;

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub document_id: DocumentId,
    pub path: PathBuf,
    pub size: u64,
}

/// Per-document working directory holding the uploaded original and a
/// snapshot of its initial context.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store_original(
        &self,
        document_id: &DocumentId,
        data: &[u8],
        file_name: &str,
    ) -> Result<StoredFile, FileStorageError>;

    async fn write_context_snapshot(
        &self,
        document_id: &DocumentId,
        context: &str,
    ) -> Result<PathBuf, FileStorageError>;

    /// Deletes the document's directory. Removing an unknown document is not an error.
    async fn remove_document(&self, document_id: &DocumentId) -> Result<(), FileStorageError>;
}
