pub mod container;
pub mod database;
pub mod external_services;
pub mod file_system;

pub use database::create_connection_pool;
pub use external_services::OpenAiCompletionProvider;
pub use file_system::LocalFileStorage;
