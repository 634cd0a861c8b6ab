//! Strategy 3: structural content-stream walk via the `pdf` crate.
//!
//! Walks every page's operation list and collects `TextDraw` operands.
//! Catches documents whose text layer confuses the faster readers.

use pdf::file::FileOptions;

use super::types::{StrategyKind, TextStrategy};
use super::ExtractionError;

pub struct ContentStreamStrategy;

impl TextStrategy for ContentStreamStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ContentStream
    }

    fn extract(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let file = FileOptions::cached()
            .load(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        let resolver = file.resolver();
        let mut full_text = String::new();

        for page_num in 0..file.num_pages() {
            let page = file
                .get_page(page_num)
                .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
            if let Some(content) = &page.contents {
                let operations = content
                    .operations(&resolver)
                    .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
                for op in operations.iter() {
                    if let pdf::content::Op::TextDraw { text } = op {
                        full_text.push_str(&text.to_string_lossy());
                        full_text.push(' ');
                    }
                }
            }
            full_text.push('\n');
        }
        Ok(full_text)
    }
}
