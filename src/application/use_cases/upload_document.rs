use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::application::ports::document_extractor::{DocumentExtractionError, ExtractionOptions};
use crate::application::ports::{DocumentExtractor, FileStorage};
use crate::application::services::build_initial_context;
use crate::domain::entities::{ContextRecord, ExtractedDocument};
use crate::domain::repositories::ContextRepository;
use crate::domain::value_objects::DocumentId;

#[derive(Debug, Error)]
pub enum UploadDocumentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Extraction error: {0}")]
    ExtractionError(String),
}

impl From<DocumentExtractionError> for UploadDocumentError {
    fn from(error: DocumentExtractionError) -> Self {
        match error {
            DocumentExtractionError::UnsupportedFormat(format) => {
                UploadDocumentError::UnsupportedFormat(format)
            }
            other => UploadDocumentError::ExtractionError(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadDocumentRequest {
    pub file_name: String,
    pub file_data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadDocumentResponse {
    pub document_id: DocumentId,
    pub document: ExtractedDocument,
    pub context_persisted: bool,
}

pub struct UploadDocumentUseCase {
    document_extractor: Arc<dyn DocumentExtractor>,
    file_storage: Arc<dyn FileStorage>,
    context_repository: Arc<dyn ContextRepository>,
}

impl UploadDocumentUseCase {
    pub fn new(
        document_extractor: Arc<dyn DocumentExtractor>,
        file_storage: Arc<dyn FileStorage>,
        context_repository: Arc<dyn ContextRepository>,
    ) -> Self {
        Self {
            document_extractor,
            file_storage,
            context_repository,
        }
    }

    pub async fn execute(
        &self,
        request: UploadDocumentRequest,
    ) -> Result<UploadDocumentResponse, UploadDocumentError> {
        if request.file_name.trim().is_empty() {
            return Err(UploadDocumentError::ValidationError(
                "File name cannot be empty".to_string(),
            ));
        }

        if request.file_data.is_empty() {
            return Err(UploadDocumentError::ValidationError(
                "File data cannot be empty".to_string(),
            ));
        }

        let extension = Path::new(&request.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        if !self.document_extractor.can_extract(&extension) {
            return Err(UploadDocumentError::UnsupportedFormat(format!(
                "'{}' (supported: {})",
                request.file_name,
                self.document_extractor.supported_formats().join(", ")
            )));
        }

        if let Some(max_size) = self.document_extractor.max_file_size() {
            if request.file_data.len() > max_size {
                return Err(UploadDocumentError::ValidationError(format!(
                    "File exceeds the maximum size of {} bytes",
                    max_size
                )));
            }
        }

        let start_time = Instant::now();
        let document_id = DocumentId::generate();

        let stored = self
            .file_storage
            .store_original(&document_id, &request.file_data, &request.file_name)
            .await
            .map_err(|e| UploadDocumentError::StorageError(e.to_string()))?;

        tracing::info!(document_id = %document_id, path = %stored.path.display(), "Saved upload");

        let content = match self
            .document_extractor
            .extract(&stored.path, ExtractionOptions::default())
            .await
        {
            Ok(content) => content,
            Err(e) => {
                if let Err(cleanup) = self.file_storage.remove_document(&document_id).await {
                    tracing::warn!(
                        document_id = %document_id,
                        error = %cleanup,
                        "Failed to remove upload after extraction error"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            document_id = %document_id,
            pages = content.page_count,
            tables = content.tables.len(),
            figures = content.figures.len(),
            "Extraction finished"
        );

        let document = content.into_document(request.file_name, document_id);
        let context = build_initial_context(&document)
            .map_err(|e| UploadDocumentError::ExtractionError(e.to_string()))?;

        if let Err(e) = self
            .file_storage
            .write_context_snapshot(&document_id, &context.render())
            .await
        {
            tracing::warn!(document_id = %document_id, error = %e, "Failed to write context snapshot");
        }

        // Local processing already succeeded, so a store failure is logged and
        // the caller still gets the extraction result.
        let record = ContextRecord::new(document_id, &context);
        let context_persisted = match self.context_repository.insert(&record).await {
            Ok(()) => {
                tracing::info!(document_id = %document_id, "Context stored");
                true
            }
            Err(e) => {
                tracing::error!(document_id = %document_id, error = %e, "Failed to store context");
                false
            }
        };

        tracing::info!(
            document_id = %document_id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Upload processed"
        );

        Ok(UploadDocumentResponse {
            document_id,
            document,
            context_persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::document_extractor::ExtractedContent;
    use crate::domain::entities::{ExtractedTables, ExtractedText};
    use crate::infrastructure::database::repositories::InMemoryContextRepository;
    use crate::infrastructure::file_system::LocalFileStorage;
    use crate::test_support::{FailingWritesRepository, StaticExtractor};

    fn use_case(
        extractor: StaticExtractor,
        repository: Arc<dyn ContextRepository>,
        dir: &Path,
    ) -> UploadDocumentUseCase {
        UploadDocumentUseCase::new(
            Arc::new(extractor),
            Arc::new(LocalFileStorage::new(dir.to_path_buf())),
            repository,
        )
    }

    fn request(name: &str) -> UploadDocumentRequest {
        UploadDocumentRequest {
            file_name: name.to_string(),
            file_data: b"%PDF-1.5 fake".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_upload_creates_exactly_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(InMemoryContextRepository::new());
        let uc = use_case(StaticExtractor::new("Title\nAbstract"), repository.clone(), dir.path());

        let response = uc.execute(request("paper.pdf")).await.unwrap();

        assert!(response.context_persisted);
        assert_eq!(repository.len().await, 1);
        assert_eq!(response.document.filename, "paper.pdf");
        assert_eq!(response.document.document_id, response.document_id);
        assert_eq!(response.document.text.title, "Title");

        let record = repository
            .find_by_id(&response.document_id)
            .await
            .unwrap()
            .unwrap();
        let expected = build_initial_context(&response.document).unwrap().render();
        assert_eq!(record.context(), expected);

        let snapshot = dir
            .path()
            .join(response.document_id.to_string())
            .join("context.txt");
        assert_eq!(std::fs::read_to_string(snapshot).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_fail_upload() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(FailingWritesRepository::new(Arc::new(
            InMemoryContextRepository::new(),
        )));
        let uc = use_case(StaticExtractor::new("Title"), repository, dir.path());

        let response = uc.execute(request("paper.pdf")).await.unwrap();

        assert!(!response.context_persisted);
    }

    #[tokio::test]
    async fn test_text_extraction_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(InMemoryContextRepository::new());
        let uc = use_case(StaticExtractor::failing(), repository.clone(), dir.path());

        let result = uc.execute(request("paper.pdf")).await;

        assert!(matches!(result, Err(UploadDocumentError::ExtractionError(_))));
        assert_eq!(repository.len().await, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(InMemoryContextRepository::new());
        let uc = use_case(StaticExtractor::new("x"), repository, dir.path());

        let result = uc.execute(request("notes.docx")).await;

        assert!(matches!(result, Err(UploadDocumentError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(InMemoryContextRepository::new());
        let uc = use_case(StaticExtractor::new("x"), repository, dir.path());

        let result = uc
            .execute(UploadDocumentRequest {
                file_name: "paper.pdf".to_string(),
                file_data: Vec::new(),
            })
            .await;

        assert!(matches!(result, Err(UploadDocumentError::ValidationError(_))));
    }

    #[test]
    fn test_content_into_document_keeps_parts() {
        let id = DocumentId::generate();
        let content = ExtractedContent {
            text: ExtractedText::from_full_text("T"),
            tables: ExtractedTables::Failed("boom".into()),
            figures: Vec::new(),
            page_count: 1,
        };
        let document = content.into_document("a.pdf".into(), id);
        assert_eq!(document.document_id, id);
        assert!(document.tables.is_failed());
    }
}
