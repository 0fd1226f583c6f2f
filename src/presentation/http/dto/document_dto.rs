use serde::{Deserialize, Serialize};

use crate::application::use_cases::upload_document::UploadDocumentResponse;
use crate::domain::entities::ExtractedDocument;
use crate::domain::value_objects::DocumentId;

#[derive(Debug, Serialize)]
pub struct UploadResponseDto {
    pub status: String,
    pub document_id: DocumentId,
    pub result: ExtractedDocument,
}

impl From<UploadDocumentResponse> for UploadResponseDto {
    fn from(response: UploadDocumentResponse) -> Self {
        Self {
            status: "ok".to_string(),
            document_id: response.document_id,
            result: response.document,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequestDto {
    pub document_id: String,
    pub question: String,
}
