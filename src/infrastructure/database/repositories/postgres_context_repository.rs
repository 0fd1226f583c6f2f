use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::entities::ContextRecord;
use crate::domain::repositories::{ContextRepository, ContextRepositoryError};
use crate::domain::value_objects::DocumentId;
use crate::infrastructure::database::{DbConnection, DbPool};
use crate::infrastructure::database::models::{ContextModel, NewContextModel};
use crate::infrastructure::database::schema::document_contexts;

pub struct PostgresContextRepository {
    pool: DbPool,
}

impl PostgresContextRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_connection(&self) -> Result<DbConnection, ContextRepositoryError> {
        self.pool.get().map_err(|e| {
            ContextRepositoryError::DatabaseError(format!(
                "Failed to get database connection: {}",
                e
            ))
        })
    }
}

fn map_insert_error(error: DieselError, document_id: DocumentId) -> ContextRepositoryError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ContextRepositoryError::Duplicate(document_id)
        }
        other => ContextRepositoryError::DatabaseError(format!("Failed to insert context: {}", other)),
    }
}

fn into_record(model: ContextModel) -> Result<ContextRecord, ContextRepositoryError> {
    ContextRecord::try_from(model).map_err(ContextRepositoryError::DatabaseError)
}

fn join_error(e: tokio::task::JoinError) -> ContextRepositoryError {
    ContextRepositoryError::DatabaseError(format!("Task join error: {}", e))
}

/// A single conditional UPDATE. When it touches nothing, the current version
/// tells a missing row apart from a lost race.
fn conditional_replace(
    conn: &mut PgConnection,
    key: &str,
    new_context: String,
    expected_version: i64,
) -> Result<(Option<ContextModel>, Option<i64>), ContextRepositoryError> {
    let updated = diesel::update(
        document_contexts::table
            .filter(document_contexts::document_id.eq(key))
            .filter(document_contexts::version.eq(expected_version)),
    )
    .set((
        document_contexts::context.eq(new_context),
        document_contexts::version.eq(document_contexts::version + 1i64),
        document_contexts::updated_at.eq(Utc::now()),
    ))
    .returning(ContextModel::as_returning())
    .get_result::<ContextModel>(conn)
    .optional()
    .map_err(|e| ContextRepositoryError::DatabaseError(format!("Failed to replace context: {}", e)))?;

    if updated.is_some() {
        return Ok((updated, None));
    }

    let current_version = document_contexts::table
        .filter(document_contexts::document_id.eq(key))
        .select(document_contexts::version)
        .first::<i64>(conn)
        .optional()
        .map_err(|e| {
            ContextRepositoryError::DatabaseError(format!("Failed to read context version: {}", e))
        })?;

    Ok((None, current_version))
}

#[async_trait]
impl ContextRepository for PostgresContextRepository {
    async fn insert(&self, record: &ContextRecord) -> Result<(), ContextRepositoryError> {
        let new_context = NewContextModel::from(record);
        let document_id = record.document_id();
        let mut conn = self.get_connection()?;

        tokio::task::spawn_blocking(move || {
            diesel::insert_into(document_contexts::table)
                .values(&new_context)
                .execute(&mut conn)
                .map_err(|e| map_insert_error(e, document_id))
        })
        .await
        .map_err(join_error)??;

        Ok(())
    }

    async fn find_by_id(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<ContextRecord>, ContextRepositoryError> {
        let key = document_id.to_string();
        let mut conn = self.get_connection()?;

        let result = tokio::task::spawn_blocking(move || {
            document_contexts::table
                .filter(document_contexts::document_id.eq(key))
                .select(ContextModel::as_select())
                .first::<ContextModel>(&mut conn)
                .optional()
                .map_err(|e| {
                    ContextRepositoryError::DatabaseError(format!("Failed to find context: {}", e))
                })
        })
        .await
        .map_err(join_error)??;

        result.map(into_record).transpose()
    }

    async fn replace(
        &self,
        document_id: &DocumentId,
        context: &str,
    ) -> Result<ContextRecord, ContextRepositoryError> {
        let key = document_id.to_string();
        let new_context = context.to_string();
        let mut conn = self.get_connection()?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::update(document_contexts::table.filter(document_contexts::document_id.eq(key)))
                .set((
                    document_contexts::context.eq(new_context),
                    document_contexts::version.eq(document_contexts::version + 1i64),
                    document_contexts::updated_at.eq(Utc::now()),
                ))
                .returning(ContextModel::as_returning())
                .get_result::<ContextModel>(&mut conn)
                .optional()
                .map_err(|e| {
                    ContextRepositoryError::DatabaseError(format!("Failed to replace context: {}", e))
                })
        })
        .await
        .map_err(join_error)??;

        match result {
            Some(model) => into_record(model),
            None => Err(ContextRepositoryError::NotFound(*document_id)),
        }
    }

    async fn replace_if_version(
        &self,
        document_id: &DocumentId,
        context: &str,
        expected_version: i64,
    ) -> Result<ContextRecord, ContextRepositoryError> {
        let key = document_id.to_string();
        let new_context = context.to_string();
        let mut conn = self.get_connection()?;

        let (updated, current_version) = tokio::task::spawn_blocking(move || {
            conditional_replace(&mut conn, &key, new_context, expected_version)
        })
        .await
        .map_err(join_error)??;

        match (updated, current_version) {
            (Some(model), _) => into_record(model),
            (None, Some(actual)) => Err(ContextRepositoryError::VersionConflict {
                expected: expected_version,
                actual,
            }),
            (None, None) => Err(ContextRepositoryError::NotFound(*document_id)),
        }
    }
}
