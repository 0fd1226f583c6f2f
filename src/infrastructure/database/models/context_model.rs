use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::entities::ContextRecord;
use crate::domain::value_objects::DocumentId;
use crate::infrastructure::database::schema::document_contexts;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = document_contexts)]
#[diesel(primary_key(document_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContextModel {
    pub document_id: String,
    pub context: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_contexts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewContextModel {
    pub document_id: String,
    pub context: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ContextRecord> for NewContextModel {
    fn from(record: &ContextRecord) -> Self {
        Self {
            document_id: record.document_id().to_string(),
            context: record.context().to_string(),
            version: record.version(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        }
    }
}

impl TryFrom<ContextModel> for ContextRecord {
    type Error = String;

    fn try_from(model: ContextModel) -> Result<Self, Self::Error> {
        let document_id = DocumentId::parse(&model.document_id)
            .map_err(|e| format!("Invalid document id in store: {}", e))?;

        Ok(ContextRecord::from_persistence(
            document_id,
            model.context,
            model.version,
            model.created_at,
            model.updated_at,
        ))
    }
}
