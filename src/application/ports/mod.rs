pub mod completion_provider;
pub mod document_extractor;
pub mod file_storage;

pub use completion_provider::CompletionProvider;
pub use document_extractor::DocumentExtractor;
pub use file_storage::FileStorage;
