//! Test doubles shared by unit tests across layers.

use async_trait::async_trait;
use futures::{StreamExt, stream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::completion_provider::{
    CompletionProvider, CompletionProviderError, CompletionStream, GenerationParams,
};
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent, ExtractionOptions,
};
use crate::domain::entities::{ContextRecord, ExtractedTables, ExtractedText};
use crate::domain::repositories::{ContextRepository, ContextRepositoryError};
use crate::domain::value_objects::DocumentId;
use crate::infrastructure::database::repositories::InMemoryContextRepository;

/// Replays a fixed list of stream items and records every prompt it sees.
pub struct ScriptedProvider {
    items: Vec<Result<String, CompletionProviderError>>,
    start_error: Option<CompletionProviderError>,
    prompts: Mutex<Vec<String>>,
    last_params: Mutex<Option<GenerationParams>>,
    pulled: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(items: Vec<Result<String, CompletionProviderError>>) -> Self {
        Self {
            items,
            start_error: None,
            prompts: Mutex::new(Vec::new()),
            last_params: Mutex::new(None),
            pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_chunks(chunks: &[&str]) -> Self {
        Self::new(chunks.iter().map(|c| Ok(c.to_string())).collect())
    }

    pub fn failing_on_start(error: CompletionProviderError) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.start_error = Some(error);
        provider
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        self.last_params.lock().unwrap().clone()
    }

    /// Number of items consumers have pulled from streams handed out so far.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn stream(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<CompletionStream, CompletionProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        *self.last_params.lock().unwrap() = Some(params.clone());

        if let Some(error) = &self.start_error {
            return Err(error.clone());
        }

        let pulled = self.pulled.clone();
        let items = stream::iter(self.items.clone()).inspect(move |_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        });
        Ok(Box::pin(items))
    }

    fn model_info(&self) -> String {
        "scripted".to_string()
    }
}

/// Reads pass through; every write fails.
pub struct FailingWritesRepository {
    inner: Arc<InMemoryContextRepository>,
}

impl FailingWritesRepository {
    pub fn new(inner: Arc<InMemoryContextRepository>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ContextRepository for FailingWritesRepository {
    async fn insert(&self, _record: &ContextRecord) -> Result<(), ContextRepositoryError> {
        Err(ContextRepositoryError::DatabaseError(
            "connection refused".to_string(),
        ))
    }

    async fn find_by_id(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<ContextRecord>, ContextRepositoryError> {
        self.inner.find_by_id(document_id).await
    }

    async fn replace(
        &self,
        _document_id: &DocumentId,
        _context: &str,
    ) -> Result<ContextRecord, ContextRepositoryError> {
        Err(ContextRepositoryError::DatabaseError(
            "connection refused".to_string(),
        ))
    }

    async fn replace_if_version(
        &self,
        _document_id: &DocumentId,
        _context: &str,
        _expected_version: i64,
    ) -> Result<ContextRecord, ContextRepositoryError> {
        Err(ContextRepositoryError::DatabaseError(
            "connection refused".to_string(),
        ))
    }
}

/// Extractor returning canned text for any `.pdf`, without touching the file.
pub struct StaticExtractor {
    full_text: Option<String>,
}

impl StaticExtractor {
    pub fn new(full_text: &str) -> Self {
        Self {
            full_text: Some(full_text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { full_text: None }
    }
}

#[async_trait]
impl DocumentExtractor for StaticExtractor {
    async fn extract(
        &self,
        _file_path: &Path,
        _options: ExtractionOptions,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        match &self.full_text {
            Some(text) => Ok(ExtractedContent {
                text: ExtractedText::from_full_text(text),
                tables: ExtractedTables::default(),
                figures: Vec::new(),
                page_count: 1,
            }),
            None => Err(DocumentExtractionError::CorruptedFile(
                "not a PDF".to_string(),
            )),
        }
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["pdf".to_string()]
    }

    fn can_extract(&self, file_extension: &str) -> bool {
        file_extension.eq_ignore_ascii_case("pdf")
    }

    fn max_file_size(&self) -> Option<usize> {
        None
    }
}

/// An uncompressed 8-bit image XObject to embed in [`sample_pdf_with_images`].
pub struct SampleImage {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    pub pixels: Vec<u8>,
}

impl SampleImage {
    pub fn gray(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_space: "DeviceGray",
            pixels: vec![0x80; (width * height) as usize],
        }
    }
}

/// Builds a one-page PDF with one text line per entry, in Courier so runs of
/// spaces survive text extraction.
pub fn sample_pdf(lines: &[&str]) -> Vec<u8> {
    sample_pdf_with_images(lines, &[])
}

pub fn sample_pdf_with_images(lines: &[&str], images: &[SampleImage]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new(
            "Td",
            vec![72.into(), (760 - 20 * i as i64).into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }

    let mut xobjects = Dictionary::new();
    for (i, image) in images.iter().enumerate() {
        let name = format!("Im{}", i + 1);
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => image.color_space,
                "BitsPerComponent" => 8,
            },
            image.pixels.clone(),
        ));
        xobjects.set(name.as_str(), image_id);

        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                (image.width as i64).into(),
                0.into(),
                0.into(),
                (image.height as i64).into(),
                72.into(),
                100.into(),
            ],
        ));
        operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        operations.push(Operation::new("Q", vec![]));
    }

    let mut resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };
    if !images.is_empty() {
        resources.set("XObject", xobjects);
    }
    let resources_id = doc.add_object(resources);

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
