use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::ContextRecord;
use crate::domain::value_objects::DocumentId;

#[derive(Debug, Error)]
pub enum ContextRepositoryError {
    #[error("Context not found: {0}")]
    NotFound(DocumentId),
    #[error("Duplicate context: {0}")]
    Duplicate(DocumentId),
    #[error("Version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: i64, actual: i64 },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Keyed persistent store holding one context blob per document.
///
/// Every call is a single remote operation; there are no multi-call
/// transactions, so read-modify-write cycles go through
/// [`ContextRepository::replace_if_version`].
#[async_trait]
pub trait ContextRepository: Send + Sync {
    /// Fails with [`ContextRepositoryError::Duplicate`] if the id is taken.
    async fn insert(&self, record: &ContextRecord) -> Result<(), ContextRepositoryError>;

    async fn find_by_id(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<ContextRecord>, ContextRepositoryError>;

    /// Unconditional full replace.
    async fn replace(
        &self,
        document_id: &DocumentId,
        context: &str,
    ) -> Result<ContextRecord, ContextRepositoryError>;

    /// Full replace that only applies while the stored version still equals
    /// `expected_version`.
    async fn replace_if_version(
        &self,
        document_id: &DocumentId,
        context: &str,
        expected_version: i64,
    ) -> Result<ContextRecord, ContextRepositoryError>;
}
