use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ContextBlob, DocumentId};

/// The persisted context of one document. `version` starts at 1 and is bumped
/// by every replace so writers can detect that someone else committed first.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRecord {
    document_id: DocumentId,
    context: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContextRecord {
    pub const INITIAL_VERSION: i64 = 1;

    pub fn new(document_id: DocumentId, context: &ContextBlob) -> Self {
        let now = Utc::now();
        Self {
            document_id,
            context: context.render(),
            version: Self::INITIAL_VERSION,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_persistence(
        document_id: DocumentId,
        context: String,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            document_id,
            context,
            version,
            created_at,
            updated_at,
        }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn blob(&self) -> ContextBlob {
        ContextBlob::from_stored(self.context.clone())
    }

    /// Replaces the whole blob and bumps the version.
    pub fn replace_context(&mut self, context: String) {
        self.context = context;
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Turn;

    #[test]
    fn test_new_record_starts_at_initial_version() {
        let blob = ContextBlob::from_document("{}");
        let record = ContextRecord::new(DocumentId::generate(), &blob);
        assert_eq!(record.version(), ContextRecord::INITIAL_VERSION);
        assert_eq!(record.context(), blob.render());
        assert_eq!(record.created_at(), record.updated_at());
    }

    #[test]
    fn test_replace_bumps_version() {
        let blob = ContextBlob::from_document("{}");
        let mut record = ContextRecord::new(DocumentId::generate(), &blob);

        let mut next = record.blob();
        next.append(Turn::new("Q", "A"));
        record.replace_context(next.render());

        assert_eq!(record.version(), 2);
        assert!(record.context().ends_with("\nUser: Q\nAI: A\n"));
    }
}
