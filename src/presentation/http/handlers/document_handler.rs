use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::UploadDocumentUseCase;
use crate::application::use_cases::upload_document::UploadDocumentRequest;
use crate::presentation::http::dto::UploadResponseDto;
use crate::presentation::http::errors::AppError;

const FILE_FIELD: &str = "file";

pub struct DocumentHandler {
    upload_use_case: Arc<UploadDocumentUseCase>,
}

impl DocumentHandler {
    pub fn new(upload_use_case: Arc<UploadDocumentUseCase>) -> Self {
        Self { upload_use_case }
    }

    pub async fn upload_document(
        State(handler): State<Arc<DocumentHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field
                .file_name()
                .ok_or_else(|| AppError::BadRequest("File field has no file name".to_string()))?
                .to_string();

            let file_data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?
                .to_vec();

            tracing::info!(file_name = %file_name, size = file_data.len(), "Received upload");

            let response = handler
                .upload_use_case
                .execute(UploadDocumentRequest {
                    file_name,
                    file_data,
                })
                .await?;

            return Ok((StatusCode::OK, Json(UploadResponseDto::from(response))));
        }

        Err(AppError::BadRequest(
            "No file provided in the request".to_string(),
        ))
    }
}
