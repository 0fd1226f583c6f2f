pub mod completion_client;
pub mod document_extractors;

pub use completion_client::{CompletionClientConfig, OpenAiCompletionProvider};
