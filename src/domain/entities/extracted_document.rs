use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::domain::value_objects::DocumentId;

pub const NO_TITLE: &str = "No Title";
pub const NO_ABSTRACT: &str = "No Abstract";

const ABSTRACT_LINES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub full_text: String,
}

impl ExtractedText {
    /// Derives the title (first line) and abstract (up to the next four lines)
    /// from the trimmed text.
    pub fn from_full_text(full_text: impl Into<String>) -> Self {
        let full_text = full_text.into();
        let trimmed = full_text.trim();

        if trimmed.is_empty() {
            return Self {
                title: NO_TITLE.to_string(),
                abstract_text: NO_ABSTRACT.to_string(),
                full_text,
            };
        }

        let lines: Vec<&str> = trimmed.split('\n').collect();
        let title = lines[0].to_string();
        let abstract_text = if lines.len() > 1 {
            let end = lines.len().min(1 + ABSTRACT_LINES);
            lines[1..end].join("\n")
        } else {
            NO_ABSTRACT.to_string()
        };

        Self {
            title,
            abstract_text,
            full_text,
        }
    }
}

/// One table grid, tagged with its 1-based position in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTable {
    pub index: usize,
    pub rows: Vec<Vec<String>>,
}

impl Serialize for ExtractedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&format!("table_{}", self.index), &self.rows)?;
        map.end()
    }
}

/// Either every table found in the document, or the single failure that
/// prevented table extraction. The two never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedTables {
    Tables(Vec<ExtractedTable>),
    Failed(String),
}

impl ExtractedTables {
    pub fn from_grids(grids: Vec<Vec<Vec<String>>>) -> Self {
        ExtractedTables::Tables(
            grids
                .into_iter()
                .enumerate()
                .map(|(i, rows)| ExtractedTable { index: i + 1, rows })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            ExtractedTables::Tables(tables) => tables.len(),
            ExtractedTables::Failed(_) => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractedTables::Failed(_))
    }
}

impl Default for ExtractedTables {
    fn default() -> Self {
        ExtractedTables::Tables(Vec::new())
    }
}

#[derive(Serialize)]
struct TableFailure<'a> {
    error: &'a str,
}

impl Serialize for ExtractedTables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtractedTables::Tables(tables) => {
                let mut seq = serializer.serialize_seq(Some(tables.len()))?;
                for table in tables {
                    seq.serialize_element(table)?;
                }
                seq.end()
            }
            ExtractedTables::Failed(message) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(&TableFailure { error: message })?;
                seq.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFigure {
    pub page_number: u32,
    pub figure_index: u32,
    pub size: (u32, u32),
    pub ocr_text: String,
}

#[derive(Serialize)]
struct FigureBody<'a> {
    size: (u32, u32),
    ocr_text: &'a str,
}

impl ExtractedFigure {
    pub fn key(&self) -> String {
        format!("page_{}_figure_{}", self.page_number, self.figure_index)
    }
}

impl Serialize for ExtractedFigure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.key(),
            &FigureBody {
                size: self.size,
                ocr_text: &self.ocr_text,
            },
        )?;
        map.end()
    }
}

/// Everything pulled out of an uploaded PDF. Field order is the canonical
/// serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub document_id: DocumentId,
    pub text: ExtractedText,
    pub tables: ExtractedTables,
    pub figures: Vec<ExtractedFigure>,
}
