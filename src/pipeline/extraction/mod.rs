//! Multi-strategy PDF text extraction.
//!
//! Strategies run in a fixed order, cheapest first; the first output that
//! clears the quality gate wins. Scanned documents fall through to the OCR
//! path, which rasterizes a capped number of pages.

mod content_stream;
mod engine;
mod ocr;
mod pdfium;
mod raw_strings;
mod text_layer;
mod types;

pub use content_stream::ContentStreamStrategy;
pub use engine::{ExtractionEngine, OcrFallback};
#[cfg(feature = "ocr")]
pub use ocr::TesseractOcr;
pub use ocr::MockOcrEngine;
pub use pdfium::{MockPageRenderer, PdfiumRenderer, PdfiumTextStrategy};
pub use raw_strings::RawStringsStrategy;
pub use text_layer::{synthetic_pdf, TextLayerStrategy};
pub use types::{
    ExtractionOutcome, OcrEngine, PageRenderer, StrategyAttempt, StrategyKind, TextStrategy,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("image processing failed: {0}")]
    ImageProcessing(String),

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR failed: {0}")]
    OcrProcessing(String),

    #[error("all extraction strategies failed ({})", summarize_attempts(.attempts))]
    AllStrategiesFailed { attempts: Vec<StrategyAttempt> },
}

/// Render the attempt list as `"text_layer: 12 chars, pdfium: 0 chars, ..."`.
pub(crate) fn summarize_attempts(attempts: &[StrategyAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {} chars", a.strategy.as_str(), a.chars))
        .collect::<Vec<_>>()
        .join(", ")
}
