pub mod ask_handler;
pub mod document_handler;

pub use ask_handler::AskHandler;
pub use document_handler::DocumentHandler;
