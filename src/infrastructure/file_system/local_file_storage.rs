use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::file_storage::{FileStorage, FileStorageError, StoredFile};
use crate::domain::value_objects::DocumentId;

const CONTEXT_SNAPSHOT: &str = "context.txt";

/// Lays documents out as `<base>/<document_id>/original.<ext>` next to a
/// `context.txt` snapshot of the initial context.
pub struct LocalFileStorage {
    base_path: PathBuf,
}

fn map_io_error(error: std::io::Error, path: &Path) -> FileStorageError {
    match error.kind() {
        ErrorKind::NotFound => FileStorageError::FileNotFound(path.display().to_string()),
        ErrorKind::PermissionDenied => {
            FileStorageError::PermissionDenied(path.display().to_string())
        }
        _ => FileStorageError::IoError(format!("{}: {}", path.display(), error)),
    }
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub async fn ensure_directory_exists(&self) -> Result<(), FileStorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| map_io_error(e, &self.base_path))
    }

    fn document_dir(&self, document_id: &DocumentId) -> PathBuf {
        self.base_path.join(document_id.to_string())
    }

    fn original_name(file_name: &str) -> Result<String, FileStorageError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .ok_or_else(|| FileStorageError::InvalidPath(file_name.to_string()))?;

        Ok(format!("original.{}", extension.to_lowercase()))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store_original(
        &self,
        document_id: &DocumentId,
        data: &[u8],
        file_name: &str,
    ) -> Result<StoredFile, FileStorageError> {
        let original = Self::original_name(file_name)?;
        let dir = self.document_dir(document_id);

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| map_io_error(e, &dir))?;

        let path = dir.join(original);
        fs::write(&path, data)
            .await
            .map_err(|e| map_io_error(e, &path))?;

        Ok(StoredFile {
            document_id: *document_id,
            path,
            size: data.len() as u64,
        })
    }

    async fn write_context_snapshot(
        &self,
        document_id: &DocumentId,
        context: &str,
    ) -> Result<PathBuf, FileStorageError> {
        let dir = self.document_dir(document_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| map_io_error(e, &dir))?;

        let path = dir.join(CONTEXT_SNAPSHOT);
        fs::write(&path, context)
            .await
            .map_err(|e| map_io_error(e, &path))?;

        Ok(path)
    }

    async fn remove_document(&self, document_id: &DocumentId) -> Result<(), FileStorageError> {
        let dir = self.document_dir(document_id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io_error(e, &dir)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_original_uses_document_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("uploads"));
        let id = DocumentId::generate();

        let stored = storage
            .store_original(&id, b"%PDF-1.5", "Paper.PDF")
            .await
            .unwrap();

        assert_eq!(
            stored.path,
            dir.path().join("uploads").join(id.to_string()).join("original.pdf")
        );
        assert_eq!(stored.size, 8);
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"%PDF-1.5");
    }

    #[tokio::test]
    async fn test_remove_document_deletes_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());
        let id = DocumentId::generate();
        storage.store_original(&id, b"x", "paper.pdf").await.unwrap();
        storage.write_context_snapshot(&id, "ctx").await.unwrap();

        storage.remove_document(&id).await.unwrap();

        assert!(!dir.path().join(id.to_string()).exists());
    }

    #[tokio::test]
    async fn test_removing_unknown_document_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());
        storage.ensure_directory_exists().await.unwrap();

        storage.remove_document(&DocumentId::generate()).await.unwrap();
    }

    #[tokio::test]
    async fn test_client_file_name_never_becomes_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());
        let id = DocumentId::generate();

        let stored = storage
            .store_original(&id, b"x", "../../etc/evil.pdf")
            .await
            .unwrap();

        assert!(stored.path.starts_with(dir.path().join(id.to_string())));
        assert_eq!(stored.path.file_name().unwrap(), "original.pdf");
    }

    #[tokio::test]
    async fn test_missing_extension_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());

        let result = storage
            .store_original(&DocumentId::generate(), b"x", "README")
            .await;

        assert!(matches!(result, Err(FileStorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_snapshot_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());
        let id = DocumentId::generate();

        let path = storage
            .write_context_snapshot(&id, "=== DOCUMENT CONTENT ===\n{}\n")
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "=== DOCUMENT CONTENT ===\n{}\n"
        );
    }
}
