pub mod figure_ocr;
pub mod pdf_extractor;
pub mod table_detector;

pub use figure_ocr::FigureOcr;
pub use pdf_extractor::PdfExtractor;
