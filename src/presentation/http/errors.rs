use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::use_cases::ask_question::AskQuestionError;
use crate::application::use_cases::upload_document::UploadDocumentError;
use crate::presentation::http::dto::{ApiResponse, ErrorCode};

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    UnprocessableDocument(String),
    NotFound,
    StorageError(String),
    DatabaseError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            // Unknown documents get a bare 404.
            AppError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            AppError::BadRequest(msg) => (ErrorCode::BadRequest, msg),
            AppError::UnprocessableDocument(msg) => (ErrorCode::ExtractionFailed, msg),
            AppError::StorageError(msg) => (ErrorCode::StorageError, msg),
            AppError::DatabaseError(msg) => (ErrorCode::DatabaseError, msg),
        };
        let status = code.status();

        tracing::debug!(status = %status, error = %message, "Request failed");

        (status, Json(ApiResponse::<()>::error(code, message))).into_response()
    }
}

impl From<UploadDocumentError> for AppError {
    fn from(error: UploadDocumentError) -> Self {
        match error {
            UploadDocumentError::ValidationError(_) | UploadDocumentError::UnsupportedFormat(_) => {
                AppError::BadRequest(error.to_string())
            }
            UploadDocumentError::ExtractionError(_) => {
                AppError::UnprocessableDocument(error.to_string())
            }
            UploadDocumentError::StorageError(_) => AppError::StorageError(error.to_string()),
        }
    }
}

impl From<AskQuestionError> for AppError {
    fn from(error: AskQuestionError) -> Self {
        match error {
            AskQuestionError::DocumentNotFound(_) => AppError::NotFound,
            AskQuestionError::RepositoryError(msg) => AppError::DatabaseError(msg),
        }
    }
}
