use async_trait::async_trait;
use lopdf::{Document, ObjectId};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::figure_ocr::{FigureOcr, RawImage, write_image_file};
use super::table_detector::detect_tables;
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent, ExtractionOptions,
};
use crate::domain::entities::{ExtractedFigure, ExtractedTables, ExtractedText};

pub struct PdfExtractor {
    ocr: FigureOcr,
    max_file_size: usize,
}

impl PdfExtractor {
    pub fn new(ocr: FigureOcr, max_file_size: usize) -> Self {
        Self { ocr, max_file_size }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(FigureOcr::default(), 50 * 1024 * 1024)
    }
}

type PageTexts = BTreeMap<u32, String>;

fn extract_page_texts(doc: &Document, pages: &BTreeMap<u32, ObjectId>) -> (PageTexts, Vec<String>) {
    let extracted: Vec<Result<(u32, String), String>> = pages
        .keys()
        .copied()
        .collect::<Vec<u32>>()
        .into_par_iter()
        .map(|page_num| -> Result<(u32, String), String> {
            let text = doc
                .extract_text(&[page_num])
                .map_err(|e| format!("Failed to extract text from page {}: {}", page_num, e))?;

            Ok((page_num, text))
        })
        .collect();

    let mut page_texts = BTreeMap::new();
    let mut errors = Vec::new();

    for page_result in extracted {
        match page_result {
            Ok((page_num, text)) => {
                page_texts.insert(page_num, text);
            }
            Err(e) => errors.push(e),
        }
    }

    (page_texts, errors)
}

/// Non-blank lines of one page, right-trimmed, as the table detector wants them.
fn table_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|s| s.trim_end().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn extract_tables(page_texts: &PageTexts, errors: &[String]) -> ExtractedTables {
    if !errors.is_empty() {
        return ExtractedTables::Failed(errors.join("; "));
    }

    let grids = page_texts
        .values()
        .flat_map(|text| detect_tables(&table_lines(text)))
        .collect();
    ExtractedTables::from_grids(grids)
}

fn extract_figures(
    doc: &Document,
    pages: &BTreeMap<u32, ObjectId>,
    ocr: &FigureOcr,
) -> Vec<ExtractedFigure> {
    let ocr_available = ocr.is_available();
    let scratch = match tempfile::tempdir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            tracing::warn!(error = %e, "No scratch directory for figure OCR");
            None
        }
    };

    let mut figures = Vec::new();

    for (page_number, page_id) in pages {
        let images = match doc.get_page_images(*page_id) {
            Ok(images) => images,
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "Failed to list page images");
                continue;
            }
        };

        for (index, image) in images.iter().enumerate() {
            let figure_index = index as u32 + 1;
            let raw = RawImage {
                id: image.id,
                width: image.width,
                height: image.height,
                color_space: image.color_space.as_deref(),
                filters: image.filters.as_deref().unwrap_or(&[]),
                bits_per_component: image.bits_per_component,
                content: image.content,
            };

            let ocr_text = match (&scratch, ocr_available) {
                (Some(dir), true) => {
                    let name = format!("page_{}_figure_{}", page_number, figure_index);
                    write_image_file(doc, &raw, dir.path(), &name)
                        .and_then(|path| ocr.recognize(&path))
                        .unwrap_or_else(|e| {
                            tracing::warn!(figure = %name, error = %e, "Figure OCR failed");
                            String::new()
                        })
                }
                _ => String::new(),
            };

            figures.push(ExtractedFigure {
                page_number: *page_number,
                figure_index,
                size: (
                    u32::try_from(raw.width).unwrap_or(0),
                    u32::try_from(raw.height).unwrap_or(0),
                ),
                ocr_text,
            });
        }
    }

    figures
}

fn extract_blocking(
    path: PathBuf,
    options: ExtractionOptions,
    ocr: FigureOcr,
) -> Result<ExtractedContent, DocumentExtractionError> {
    let mut doc = Document::load(&path)
        .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

    if doc.is_encrypted() {
        doc.decrypt(&options.password).map_err(|_e| {
            DocumentExtractionError::ExtractionFailed(
                "Failed to decrypt PDF - invalid password".to_string(),
            )
        })?;
    }

    let pages = doc.get_pages();
    let (page_texts, errors) = extract_page_texts(&doc, &pages);

    if page_texts.is_empty() && !errors.is_empty() {
        return Err(DocumentExtractionError::ExtractionFailed(errors.join("; ")));
    }

    for e in &errors {
        tracing::warn!(error = %e, "Skipping page without text");
    }

    let full_text: String = page_texts.values().map(String::as_str).collect();

    let tables = if options.extract_tables {
        extract_tables(&page_texts, &errors)
    } else {
        ExtractedTables::default()
    };

    let figures = if options.extract_figures {
        extract_figures(&doc, &pages, &ocr)
    } else {
        Vec::new()
    };

    Ok(ExtractedContent {
        text: ExtractedText::from_full_text(full_text),
        tables,
        figures,
        page_count: pages.len(),
    })
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(
        &self,
        file_path: &Path,
        options: ExtractionOptions,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        let path = file_path.to_path_buf();
        let ocr = self.ocr.clone();

        tokio::task::spawn_blocking(move || extract_blocking(path, options, ocr))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(format!("Task join error: {}", e)))?
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["pdf".to_string()]
    }

    fn can_extract(&self, file_extension: &str) -> bool {
        file_extension.eq_ignore_ascii_case("pdf")
    }

    fn max_file_size(&self) -> Option<usize> {
        Some(self.max_file_size)
    }
}
