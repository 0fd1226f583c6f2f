pub mod context_builder;
pub mod conversation_service;

pub use context_builder::build_initial_context;
pub use conversation_service::{AnswerStream, AskError, ConversationService};
