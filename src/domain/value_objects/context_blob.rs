//! The conversational memory attached to a document.
//!
//! A blob is an immutable `base` (whatever text was persisted when it was
//! created or loaded) followed by the turns appended since. Rendering never
//! rewrites the base, so every rendering is a prefix of the next one.

use serde::{Deserialize, Serialize};

pub const DOCUMENT_HEADER: &str = "=== DOCUMENT CONTENT ===";
pub const HISTORY_HEADER: &str = "=== CONVERSATION HISTORY ===";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    question: String,
    answer: String,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    fn render_into(&self, out: &mut String) {
        out.push_str("\nUser: ");
        out.push_str(&self.question);
        out.push_str("\nAI: ");
        out.push_str(&self.answer);
        out.push('\n');
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlob {
    base: String,
    turns: Vec<Turn>,
}

impl ContextBlob {
    /// Wraps a serialized document between the content and history headers.
    pub fn from_document(serialized_document: &str) -> Self {
        let mut base = String::with_capacity(
            serialized_document.len() + DOCUMENT_HEADER.len() + HISTORY_HEADER.len() + 4,
        );
        base.push_str(DOCUMENT_HEADER);
        base.push('\n');
        base.push_str(serialized_document);
        base.push_str("\n\n");
        base.push_str(HISTORY_HEADER);
        base.push('\n');

        Self {
            base,
            turns: Vec::new(),
        }
    }

    /// Rehydrates a blob read back from the context store. Any history already
    /// persisted becomes part of the immutable base.
    pub fn from_stored(text: impl Into<String>) -> Self {
        Self {
            base: text.into(),
            turns: Vec::new(),
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn has_document_section(&self) -> bool {
        self.base.starts_with(DOCUMENT_HEADER) && self.base.contains(HISTORY_HEADER)
    }

    pub fn render(&self) -> String {
        let mut out = self.base.clone();
        for turn in &self.turns {
            turn.render_into(&mut out);
        }
        out
    }
}

impl std::fmt::Display for ContextBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
