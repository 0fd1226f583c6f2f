pub mod context_repository;

pub use context_repository::{ContextRepository, ContextRepositoryError};
