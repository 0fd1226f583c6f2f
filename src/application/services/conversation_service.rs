use futures::{Stream, StreamExt, stream};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::application::ports::completion_provider::{
    CompletionProvider, CompletionProviderError, CompletionStream, GenerationParams,
};
use crate::domain::entities::ContextRecord;
use crate::domain::repositories::{ContextRepository, ContextRepositoryError};
use crate::domain::value_objects::{ContextBlob, DocumentId, Turn};

/// Answer text as it is produced. Ends after the last model chunk, or after a
/// single diagnostic chunk if the provider fails.
pub type AnswerStream = Pin<Box<dyn Stream<Item = String> + Send>>;

#[derive(Debug, Error)]
pub enum AskError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

/// Grounding prompt asking the model to answer as the document itself.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an AI assistant that speaks with the voice of the uploaded research document.\n\
         Answer in the first person, as if you were the document describing your own purpose, \
         findings and ideas. Never refer to \"the document\" as a third party; say \"I discuss\" \
         or \"I show\" instead.\n\
         Keep the answer concise, accurate and conversational.\n\n\
         Use the following information as your context and memory:\n\
         {context}\n\n\
         Now, the user has asked:\n\
         \"{question}\"\n"
    )
}

pub fn provider_error_chunk(error: &CompletionProviderError) -> String {
    format!("\nProvider error: {}", error)
}

struct PendingTurn {
    document_id: DocumentId,
    question: String,
    loaded: ContextRecord,
    full_response: String,
}

enum AskState {
    Starting {
        prompt: String,
        turn: PendingTurn,
    },
    Streaming {
        chunks: CompletionStream,
        turn: PendingTurn,
    },
    Finished,
}

#[derive(Clone)]
pub struct ConversationService {
    context_repository: Arc<dyn ContextRepository>,
    completion_provider: Arc<dyn CompletionProvider>,
    params: GenerationParams,
    max_write_retries: u32,
}

impl ConversationService {
    pub fn new(
        context_repository: Arc<dyn ContextRepository>,
        completion_provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            context_repository,
            completion_provider,
            params: GenerationParams::default(),
            max_write_retries: 3,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_max_write_retries(mut self, retries: u32) -> Self {
        self.max_write_retries = retries;
        self
    }

    /// Starts one ask cycle. Lookup failures are returned before any stream
    /// exists; everything after that is reported inside the stream.
    pub async fn ask(
        &self,
        document_id: DocumentId,
        question: String,
    ) -> Result<AnswerStream, AskError> {
        let loaded = self
            .context_repository
            .find_by_id(&document_id)
            .await
            .map_err(|e| AskError::PersistenceError(e.to_string()))?
            .ok_or(AskError::NotFound(document_id))?;

        tracing::info!(
            document_id = %document_id,
            version = loaded.version(),
            "Context fetched for question"
        );

        let prompt = build_prompt(loaded.context(), &question);
        let state = AskState::Starting {
            prompt,
            turn: PendingTurn {
                document_id,
                question,
                loaded,
                full_response: String::new(),
            },
        };

        let service = self.clone();
        let answer = stream::unfold(state, move |state| {
            let service = service.clone();
            async move { service.advance(state).await }
        });

        Ok(Box::pin(answer))
    }

    async fn advance(&self, state: AskState) -> Option<(String, AskState)> {
        let (mut chunks, mut turn) = match state {
            AskState::Starting { prompt, turn } => {
                match self.completion_provider.stream(&prompt, &self.params).await {
                    Ok(chunks) => (chunks, turn),
                    Err(e) => {
                        tracing::warn!(
                            document_id = %turn.document_id,
                            error = %e,
                            "Completion provider failed before streaming"
                        );
                        return Some((provider_error_chunk(&e), AskState::Finished));
                    }
                }
            }
            AskState::Streaming { chunks, turn } => (chunks, turn),
            AskState::Finished => return None,
        };

        match chunks.next().await {
            Some(Ok(chunk)) => {
                turn.full_response.push_str(&chunk);
                Some((chunk, AskState::Streaming { chunks, turn }))
            }
            Some(Err(e)) => {
                tracing::warn!(
                    document_id = %turn.document_id,
                    received = turn.full_response.len(),
                    error = %e,
                    "Completion stream failed; turn will not be persisted"
                );
                Some((provider_error_chunk(&e), AskState::Finished))
            }
            None => {
                drop(chunks);
                self.commit(turn).await;
                None
            }
        }
    }

    // Runs on its own task so a caller hanging up mid-write cannot cancel it.
    async fn commit(&self, turn: PendingTurn) {
        let document_id = turn.document_id;
        let service = self.clone();
        let handle = tokio::spawn(async move { service.persist_turn(turn).await });

        if let Err(e) = handle.await {
            tracing::error!(document_id = %document_id, error = %e, "Context write task failed");
        }
    }

    async fn persist_turn(&self, pending: PendingTurn) {
        let document_id = pending.document_id;
        let turn = Turn::new(pending.question, pending.full_response);

        let mut expected_version = pending.loaded.version();
        let mut blob = pending.loaded.blob();
        blob.append(turn.clone());

        let mut attempt = 0;
        loop {
            match self
                .context_repository
                .replace_if_version(&document_id, &blob.render(), expected_version)
                .await
            {
                Ok(record) => {
                    tracing::info!(
                        document_id = %document_id,
                        version = record.version(),
                        "Context updated"
                    );
                    return;
                }
                Err(ContextRepositoryError::VersionConflict { expected, actual })
                    if attempt < self.max_write_retries =>
                {
                    attempt += 1;
                    tracing::warn!(
                        document_id = %document_id,
                        expected,
                        actual,
                        attempt,
                        "Context changed during answer; appending turn to latest context"
                    );

                    match self.context_repository.find_by_id(&document_id).await {
                        Ok(Some(latest)) => {
                            expected_version = latest.version();
                            blob = ContextBlob::from_stored(latest.context());
                            blob.append(turn.clone());
                        }
                        Ok(None) => {
                            tracing::error!(
                                document_id = %document_id,
                                "Context disappeared before the turn could be saved"
                            );
                            return;
                        }
                        Err(e) => {
                            tracing::error!(
                                document_id = %document_id,
                                error = %e,
                                "Failed to reload context after version conflict"
                            );
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(
                        document_id = %document_id,
                        error = %e,
                        "Failed to update context; turn dropped"
                    );
                    return;
                }
            }
        }
    }
}
