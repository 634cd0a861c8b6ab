//! Strategy 4: lightweight literal-string scan via `lopdf`.
//!
//! Decodes each page's content stream and collects the string operands of
//! the text-showing operators. A blunt last resort before OCR: no encoding
//! or positioning awareness, but it recovers text from documents the
//! structural parsers reject.

use lopdf::content::Content;
use lopdf::{Document, Object};

use super::types::{StrategyKind, TextStrategy};
use super::ExtractionError;

pub struct RawStringsStrategy;

impl TextStrategy for RawStringsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RawStrings
    }

    fn extract(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(format!("lopdf load failed: {e}")))?;

        let mut text = String::new();
        for (_page_number, page_id) in doc.get_pages() {
            let data = doc
                .get_page_content(page_id)
                .map_err(|e| ExtractionError::PdfParsing(format!("page content: {e}")))?;
            let content = Content::decode(&data)
                .map_err(|e| ExtractionError::PdfParsing(format!("content decode: {e}")))?;

            for op in &content.operations {
                match op.operator.as_str() {
                    // Tj, ' and " take a single string operand
                    "Tj" | "'" | "\"" => {
                        for operand in &op.operands {
                            append_string_operand(&mut text, operand);
                        }
                    }
                    // TJ takes an array of strings and kerning offsets
                    "TJ" => {
                        if let Some(Object::Array(items)) = op.operands.first() {
                            for item in items {
                                append_string_operand(&mut text, item);
                            }
                        }
                    }
                    "ET" => text.push('\n'),
                    _ => {}
                }
            }
        }
        Ok(text)
    }
}

fn append_string_operand(text: &mut String, operand: &Object) {
    if let Object::String(bytes, _) = operand {
        text.push_str(&String::from_utf8_lossy(bytes));
        text.push(' ');
    }
}
