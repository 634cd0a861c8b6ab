//! Strategy 1: fast text-layer read via `pdf-extract`.

use super::types::{join_nonempty_pages, StrategyKind, TextStrategy};
use super::ExtractionError;

/// Reads the embedded text layer page by page. Fastest strategy, and the
/// one that wins on well-formed digital PDFs.
pub struct TextLayerStrategy;

impl TextStrategy for TextLayerStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TextLayer
    }

    fn extract(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(format!("text layer read failed: {e}")))?;
        Ok(join_nonempty_pages(pages))
    }
}

/// Build a minimal one-page PDF whose text layer carries `text`.
///
/// Fixture for strategy and pipeline tests, kept alongside the mock
/// renderer and mock OCR engine so unit and integration tests share one
/// builder.
pub fn synthetic_pdf(text: &str) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
    let content_stream = Stream::new(dictionary! {}, content.into_bytes());
    let content_id = doc.add_object(content_stream);

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });

    if let Ok(page) = doc.get_object_mut(page_id) {
        if let Object::Dictionary(ref mut dict) = page {
            dict.set("Parent", pages_id);
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });

    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    // In-memory writes cannot fail for a well-formed document.
    doc.save_to(&mut buf).ok();
    buf
}
