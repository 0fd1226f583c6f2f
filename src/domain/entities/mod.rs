pub mod context_record;
pub mod extracted_document;

pub use context_record::ContextRecord;
pub use extracted_document::{
    ExtractedDocument, ExtractedFigure, ExtractedTable, ExtractedTables, ExtractedText,
};
