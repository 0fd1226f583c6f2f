use std::sync::Arc;
use thiserror::Error;

use crate::application::services::{AnswerStream, AskError, ConversationService};
use crate::domain::value_objects::DocumentId;

#[derive(Debug, Error)]
pub enum AskQuestionError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<AskError> for AskQuestionError {
    fn from(error: AskError) -> Self {
        match error {
            AskError::NotFound(id) => AskQuestionError::DocumentNotFound(id.to_string()),
            AskError::PersistenceError(msg) => AskQuestionError::RepositoryError(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AskQuestionRequest {
    pub document_id: String,
    pub question: String,
}

pub struct AskQuestionUseCase {
    conversation_service: Arc<ConversationService>,
}

impl AskQuestionUseCase {
    pub fn new(conversation_service: Arc<ConversationService>) -> Self {
        Self {
            conversation_service,
        }
    }

    /// An id that cannot be parsed can never have been issued, so it is
    /// reported the same way as an unknown one.
    pub async fn execute(
        &self,
        request: AskQuestionRequest,
    ) -> Result<AnswerStream, AskQuestionError> {
        let document_id = DocumentId::parse(request.document_id.trim()).map_err(|e| {
            tracing::debug!(document_id = %request.document_id, error = %e, "Rejected document id");
            AskQuestionError::DocumentNotFound(request.document_id.clone())
        })?;

        let answer = self
            .conversation_service
            .ask(document_id, request.question)
            .await?;

        Ok(answer)
    }
}
