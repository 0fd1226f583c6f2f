pub mod context_model;

pub use context_model::*;
