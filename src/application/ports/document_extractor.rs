use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::entities::{
    ExtractedDocument, ExtractedFigure, ExtractedTables, ExtractedText,
};
use crate::domain::value_objects::DocumentId;

#[derive(Debug, Error)]
pub enum DocumentExtractionError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}

/// Raw extraction output. Table and figure failures are already folded into
/// the data; only text extraction can fail the whole call.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub text: ExtractedText,
    pub tables: ExtractedTables,
    pub figures: Vec<ExtractedFigure>,
    pub page_count: usize,
}

impl ExtractedContent {
    pub fn into_document(self, filename: String, document_id: DocumentId) -> ExtractedDocument {
        ExtractedDocument {
            filename,
            document_id,
            text: self.text,
            tables: self.tables,
            figures: self.figures,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub extract_tables: bool,
    pub extract_figures: bool,
    pub password: String,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            extract_tables: true,
            extract_figures: true,
            password: String::new(),
        }
    }
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(
        &self,
        file_path: &Path,
        options: ExtractionOptions,
    ) -> Result<ExtractedContent, DocumentExtractionError>;

    fn supported_formats(&self) -> Vec<String>;

    fn can_extract(&self, file_extension: &str) -> bool;

    fn max_file_size(&self) -> Option<usize>;
}
