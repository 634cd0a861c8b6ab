//! Shared extraction types and the trait seams strategies plug into.

use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Identifies which extraction strategy produced (or failed to produce) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    TextLayer,
    Pdfium,
    ContentStream,
    RawStrings,
    Ocr,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::TextLayer => "text_layer",
            StrategyKind::Pdfium => "pdfium",
            StrategyKind::ContentStream => "content_stream",
            StrategyKind::RawStrings => "raw_strings",
            StrategyKind::Ocr => "ocr",
        }
    }
}

/// One strategy's result against the quality gate: which strategy ran and
/// how many trimmed characters it yielded (0 when it errored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub strategy: StrategyKind,
    pub chars: usize,
}

/// Accepted extraction result.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub text: String,
    pub strategy: StrategyKind,
    pub char_count: usize,
}

/// A text extraction strategy over raw PDF bytes.
///
/// Strategies are trait objects so tests can inject stubs and the engine
/// stays agnostic of which libraries back each one.
pub trait TextStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;
    fn extract(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Renders PDF pages to encoded images for the OCR path.
pub trait PageRenderer: Send + Sync {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError>;
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError>;
}

/// Recognizes text in one rendered page image.
pub trait OcrEngine: Send + Sync {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Join per-page texts with newlines, dropping pages that trim to empty.
pub fn join_nonempty_pages(pages: Vec<String>) -> String {
    pages
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
