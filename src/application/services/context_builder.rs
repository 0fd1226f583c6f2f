use thiserror::Error;

use crate::domain::entities::ExtractedDocument;
use crate::domain::value_objects::ContextBlob;

#[derive(Debug, Error)]
pub enum ContextBuildError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Renders the extracted document as pretty JSON (2-space indent, non-ASCII
/// kept verbatim) wrapped in the document and history headers.
pub fn build_initial_context(
    extracted: &ExtractedDocument,
) -> Result<ContextBlob, ContextBuildError> {
    let serialized = serde_json::to_string_pretty(extracted)
        .map_err(|e| ContextBuildError::SerializationError(e.to_string()))?;

    Ok(ContextBlob::from_document(&serialized))
}
