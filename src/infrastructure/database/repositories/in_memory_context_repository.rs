use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::ContextRecord;
use crate::domain::repositories::{ContextRepository, ContextRepositoryError};
use crate::domain::value_objects::DocumentId;

/// Process-local context store, used when no database is configured and in
/// tests. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryContextRepository {
    records: RwLock<HashMap<DocumentId, ContextRecord>>,
}

impl InMemoryContextRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ContextRepository for InMemoryContextRepository {
    async fn insert(&self, record: &ContextRecord) -> Result<(), ContextRepositoryError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.document_id()) {
            return Err(ContextRepositoryError::Duplicate(record.document_id()));
        }
        records.insert(record.document_id(), record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<ContextRecord>, ContextRepositoryError> {
        Ok(self.records.read().await.get(document_id).cloned())
    }

    async fn replace(
        &self,
        document_id: &DocumentId,
        context: &str,
    ) -> Result<ContextRecord, ContextRepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(document_id)
            .ok_or(ContextRepositoryError::NotFound(*document_id))?;
        record.replace_context(context.to_string());
        Ok(record.clone())
    }

    async fn replace_if_version(
        &self,
        document_id: &DocumentId,
        context: &str,
        expected_version: i64,
    ) -> Result<ContextRecord, ContextRepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(document_id)
            .ok_or(ContextRepositoryError::NotFound(*document_id))?;

        if record.version() != expected_version {
            return Err(ContextRepositoryError::VersionConflict {
                expected: expected_version,
                actual: record.version(),
            });
        }

        record.replace_context(context.to_string());
        Ok(record.clone())
    }
}
