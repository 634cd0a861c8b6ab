//! Runs the strategy chain against the quality gate, with OCR as the
//! terminal fallback.

use tracing::{debug, info, warn};

use crate::document::Document;

use super::content_stream::ContentStreamStrategy;
use super::pdfium::PdfiumTextStrategy;
use super::raw_strings::RawStringsStrategy;
use super::text_layer::TextLayerStrategy;
use super::types::{
    ExtractionOutcome, OcrEngine, PageRenderer, StrategyAttempt, StrategyKind, TextStrategy,
};
use super::ExtractionError;

/// The OCR path: a page renderer feeding an OCR engine, with a page cap so
/// scanned books do not rasterize end to end.
pub struct OcrFallback {
    pub renderer: Box<dyn PageRenderer>,
    pub engine: Box<dyn OcrEngine>,
    pub page_limit: usize,
    pub dpi: u32,
}

/// Ordered strategy chain with a quality gate.
///
/// Each strategy runs in turn; the first output whose trimmed length
/// exceeds the threshold is accepted. A strategy error counts as a failed
/// attempt with zero characters and the chain moves on. OCR runs last,
/// only when every text strategy came up short.
pub struct ExtractionEngine {
    strategies: Vec<Box<dyn TextStrategy>>,
    ocr: Option<OcrFallback>,
    quality_threshold: usize,
}

impl ExtractionEngine {
    pub fn new(strategies: Vec<Box<dyn TextStrategy>>, quality_threshold: usize) -> Self {
        Self {
            strategies,
            ocr: None,
            quality_threshold,
        }
    }

    /// The production chain: text layer, PDFium, content-stream walk, raw
    /// string scan.
    pub fn with_default_strategies(quality_threshold: usize) -> Self {
        Self::new(
            vec![
                Box::new(TextLayerStrategy),
                Box::new(PdfiumTextStrategy),
                Box::new(ContentStreamStrategy),
                Box::new(RawStringsStrategy),
            ],
            quality_threshold,
        )
    }

    pub fn with_ocr(mut self, ocr: OcrFallback) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Read the document from disk and extract its text.
    pub fn extract(&self, document: &Document) -> Result<ExtractionOutcome, ExtractionError> {
        let pdf_bytes = std::fs::read(&document.path)?;
        self.extract_bytes(&document.name, &pdf_bytes)
    }

    /// Run the strategy chain over in-memory PDF bytes.
    pub fn extract_bytes(
        &self,
        name: &str,
        pdf_bytes: &[u8],
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let mut attempts = Vec::new();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            match strategy.extract(pdf_bytes) {
                Ok(text) => {
                    let trimmed_chars = text.trim().chars().count();
                    if trimmed_chars > self.quality_threshold {
                        info!(
                            document = name,
                            strategy = kind.as_str(),
                            chars = trimmed_chars,
                            "Extraction accepted"
                        );
                        return Ok(ExtractionOutcome {
                            char_count: text.chars().count(),
                            text,
                            strategy: kind,
                        });
                    }
                    debug!(
                        document = name,
                        strategy = kind.as_str(),
                        chars = trimmed_chars,
                        "Output below quality threshold, trying next strategy"
                    );
                    attempts.push(StrategyAttempt {
                        strategy: kind,
                        chars: trimmed_chars,
                    });
                }
                Err(e) => {
                    debug!(
                        document = name,
                        strategy = kind.as_str(),
                        error = %e,
                        "Strategy failed, trying next"
                    );
                    attempts.push(StrategyAttempt {
                        strategy: kind,
                        chars: 0,
                    });
                }
            }
        }

        if let Some(ocr) = &self.ocr {
            match self.run_ocr(name, pdf_bytes, ocr) {
                Ok(text) => {
                    let trimmed_chars = text.trim().chars().count();
                    if trimmed_chars > self.quality_threshold {
                        info!(
                            document = name,
                            strategy = StrategyKind::Ocr.as_str(),
                            chars = trimmed_chars,
                            "OCR extraction accepted"
                        );
                        return Ok(ExtractionOutcome {
                            char_count: text.chars().count(),
                            text,
                            strategy: StrategyKind::Ocr,
                        });
                    }
                    attempts.push(StrategyAttempt {
                        strategy: StrategyKind::Ocr,
                        chars: trimmed_chars,
                    });
                }
                Err(e) => {
                    warn!(document = name, error = %e, "OCR fallback failed");
                    attempts.push(StrategyAttempt {
                        strategy: StrategyKind::Ocr,
                        chars: 0,
                    });
                }
            }
        }

        warn!(document = name, "All extraction strategies exhausted");
        Err(ExtractionError::AllStrategiesFailed { attempts })
    }

    /// Rasterize up to `page_limit` pages and OCR each one. Pages whose
    /// recognized text trims to empty are skipped; kept pages are tagged
    /// with an OCR page header.
    fn run_ocr(
        &self,
        name: &str,
        pdf_bytes: &[u8],
        ocr: &OcrFallback,
    ) -> Result<String, ExtractionError> {
        let total_pages = ocr.renderer.page_count(pdf_bytes)?;
        let pages_to_ocr = total_pages.min(ocr.page_limit);
        debug!(
            document = name,
            total_pages,
            pages_to_ocr,
            "Starting OCR fallback"
        );

        let mut sections = Vec::new();
        for page_number in 0..pages_to_ocr {
            let image = ocr.renderer.render_page(pdf_bytes, page_number, ocr.dpi)?;
            let text = ocr.engine.ocr_image(&image)?;
            if text.trim().is_empty() {
                continue;
            }
            sections.push(format!("=== PAGE {} (OCR) ===\n{}", page_number + 1, text));
        }
        Ok(sections.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::super::ocr::MockOcrEngine;
    use super::super::pdfium::MockPageRenderer;
    use super::*;

    /// Stub strategy that logs its invocation and returns a fixed result.
    struct StubStrategy {
        kind: StrategyKind,
        result: Result<String, ()>,
        log: Arc<Mutex<Vec<StrategyKind>>>,
    }

    impl StubStrategy {
        fn ok(kind: StrategyKind, text: &str, log: &Arc<Mutex<Vec<StrategyKind>>>) -> Box<Self> {
            Box::new(Self {
                kind,
                result: Ok(text.to_string()),
                log: Arc::clone(log),
            })
        }

        fn failing(kind: StrategyKind, log: &Arc<Mutex<Vec<StrategyKind>>>) -> Box<Self> {
            Box::new(Self {
                kind,
                result: Err(()),
                log: Arc::clone(log),
            })
        }
    }

    impl TextStrategy for StubStrategy {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn extract(&self, _pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
            self.log.lock().unwrap().push(self.kind);
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(ExtractionError::PdfParsing("stub failure".into())),
            }
        }
    }

    fn long_text() -> String {
        "sufficiently long extracted body text ".repeat(5)
    }

    #[test]
    fn first_passing_strategy_short_circuits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let engine = ExtractionEngine::new(
            vec![
                StubStrategy::ok(StrategyKind::TextLayer, "too short", &log),
                StubStrategy::failing(StrategyKind::Pdfium, &log),
                StubStrategy::ok(StrategyKind::ContentStream, &long_text(), &log),
                StubStrategy::ok(StrategyKind::RawStrings, &long_text(), &log),
            ],
            100,
        );

        let outcome = engine.extract_bytes("doc.pdf", b"irrelevant").unwrap();
        assert_eq!(outcome.strategy, StrategyKind::ContentStream);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                StrategyKind::TextLayer,
                StrategyKind::Pdfium,
                StrategyKind::ContentStream
            ],
            "later strategies must not run after one passes the gate"
        );
    }

    #[test]
    fn gate_is_strictly_greater_than_threshold() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let exactly_100 = "x".repeat(100);
        let engine = ExtractionEngine::new(
            vec![StubStrategy::ok(StrategyKind::TextLayer, &exactly_100, &log)],
            100,
        );

        let err = engine.extract_bytes("doc.pdf", b"irrelevant").unwrap_err();
        match err {
            ExtractionError::AllStrategiesFailed { attempts } => {
                assert_eq!(attempts.len(), 1);
                assert_eq!(attempts[0].chars, 100);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn all_failed_carries_ordered_attempts() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let engine = ExtractionEngine::new(
            vec![
                StubStrategy::ok(StrategyKind::TextLayer, "short", &log),
                StubStrategy::failing(StrategyKind::Pdfium, &log),
            ],
            100,
        );

        let err = engine.extract_bytes("doc.pdf", b"irrelevant").unwrap_err();
        match err {
            ExtractionError::AllStrategiesFailed { attempts } => {
                assert_eq!(attempts[0].strategy, StrategyKind::TextLayer);
                assert_eq!(attempts[0].chars, 5);
                assert_eq!(attempts[1].strategy, StrategyKind::Pdfium);
                assert_eq!(attempts[1].chars, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ocr_fallback_runs_when_text_strategies_fail() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ocr_text = "recognized scanned page content ".repeat(5);
        let engine = ExtractionEngine::new(
            vec![StubStrategy::failing(StrategyKind::TextLayer, &log)],
            100,
        )
        .with_ocr(OcrFallback {
            renderer: Box::new(MockPageRenderer::new(2)),
            engine: Box::new(MockOcrEngine::new(&ocr_text)),
            page_limit: 5,
            dpi: 200,
        });

        let outcome = engine.extract_bytes("scan.pdf", b"irrelevant").unwrap();
        assert_eq!(outcome.strategy, StrategyKind::Ocr);
        assert!(outcome.text.contains("=== PAGE 1 (OCR) ==="));
        assert!(outcome.text.contains("=== PAGE 2 (OCR) ==="));
    }

    #[test]
    fn ocr_respects_page_limit() {
        struct CountingRenderer {
            rendered: Arc<AtomicUsize>,
        }

        impl PageRenderer for CountingRenderer {
            fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
                Ok(40)
            }

            fn render_page(
                &self,
                _pdf_bytes: &[u8],
                _page_number: usize,
                _dpi: u32,
            ) -> Result<Vec<u8>, ExtractionError> {
                self.rendered.fetch_add(1, Ordering::SeqCst);
                Ok(vec![0u8; 4])
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let rendered = Arc::new(AtomicUsize::new(0));
        let ocr_text = "page text from a very long scanned document ".repeat(4);
        let engine = ExtractionEngine::new(
            vec![StubStrategy::failing(StrategyKind::TextLayer, &log)],
            100,
        )
        .with_ocr(OcrFallback {
            renderer: Box::new(CountingRenderer {
                rendered: Arc::clone(&rendered),
            }),
            engine: Box::new(MockOcrEngine::new(&ocr_text)),
            page_limit: 5,
            dpi: 200,
        });

        engine.extract_bytes("scan.pdf", b"irrelevant").unwrap();
        assert_eq!(rendered.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn ocr_below_gate_is_recorded_as_attempt() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let engine = ExtractionEngine::new(
            vec![StubStrategy::failing(StrategyKind::TextLayer, &log)],
            100,
        )
        .with_ocr(OcrFallback {
            renderer: Box::new(MockPageRenderer::new(1)),
            engine: Box::new(MockOcrEngine::new("faint")),
            page_limit: 5,
            dpi: 200,
        });

        let err = engine.extract_bytes("scan.pdf", b"irrelevant").unwrap_err();
        match err {
            ExtractionError::AllStrategiesFailed { attempts } => {
                let ocr = attempts.last().unwrap();
                assert_eq!(ocr.strategy, StrategyKind::Ocr);
                assert!(ocr.chars > 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let engine = ExtractionEngine::new(Vec::new(), 100);
        let doc = Document::new(std::path::PathBuf::from("/nonexistent/paper.pdf"));
        let err = engine.extract(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }
}
