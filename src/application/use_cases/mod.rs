pub mod ask_question;
pub mod upload_document;

pub use ask_question::AskQuestionUseCase;
pub use upload_document::UploadDocumentUseCase;
