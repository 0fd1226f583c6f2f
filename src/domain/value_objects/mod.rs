pub mod context_blob;
pub mod document_id;

pub use context_blob::{ContextBlob, Turn};
pub use document_id::DocumentId;
