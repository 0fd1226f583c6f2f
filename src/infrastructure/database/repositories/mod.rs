pub mod in_memory_context_repository;
pub mod postgres_context_repository;

pub use in_memory_context_repository::InMemoryContextRepository;
pub use postgres_context_repository::PostgresContextRepository;
