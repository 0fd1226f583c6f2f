use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;

use crate::application::use_cases::AskQuestionUseCase;
use crate::application::use_cases::ask_question::AskQuestionRequest;
use crate::presentation::http::dto::AskRequestDto;
use crate::presentation::http::errors::AppError;

pub struct AskHandler {
    ask_use_case: Arc<AskQuestionUseCase>,
}

impl AskHandler {
    pub fn new(ask_use_case: Arc<AskQuestionUseCase>) -> Self {
        Self { ask_use_case }
    }

    /// Streams the answer as plain text. Dropping the connection drops the
    /// body stream, which stops the answer and skips the history update.
    pub async fn ask(
        State(handler): State<Arc<AskHandler>>,
        Json(request): Json<AskRequestDto>,
    ) -> Result<Response, AppError> {
        let answer = handler
            .ask_use_case
            .execute(AskQuestionRequest {
                document_id: request.document_id,
                question: request.question,
            })
            .await?;

        let body = Body::from_stream(answer.map(Ok::<_, Infallible>));

        Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response())
    }
}
