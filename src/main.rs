use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use litsift::config::PipelineConfig;
use litsift::document::enumerate_pdfs;
use litsift::pipeline::batch::BatchRunner;
use litsift::pipeline::enrichment::{InfoExtractor, OpenRouterClient};
use litsift::pipeline::extraction::ExtractionEngine;
use litsift::store::RecordStore;

/// Bulk literature triage: extract text from a directory of PDF papers,
/// derive structured metadata through a model service and append one row
/// per paper to a CSV summary table.
#[derive(Parser, Debug)]
#[command(name = "litsift", version, about)]
struct Cli {
    /// Directory containing the input PDFs.
    #[arg(long, default_value = "papers")]
    source_dir: PathBuf,

    /// Destination CSV summary table.
    #[arg(long, default_value = "batch_papers_summary.csv")]
    output: PathBuf,

    /// Documents processed concurrently per batch.
    #[arg(long, default_value_t = 10)]
    batch_size: usize,

    /// Model-service attempts per document.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Page cap for the OCR fallback.
    #[arg(long, default_value_t = 5)]
    ocr_pages: usize,

    /// Minimum trimmed character count for extracted text to be accepted.
    #[arg(long, default_value_t = 100)]
    quality_threshold: usize,

    /// Seconds to pause between batches.
    #[arg(long, default_value_t = 2)]
    batch_delay: u64,

    /// Model identifier.
    #[arg(long, default_value = "openai/gpt-4o-mini")]
    model: String,

    /// OpenAI-compatible service base URL.
    #[arg(long, default_value = "https://openrouter.ai/api/v1")]
    base_url: String,

    /// Skip files that already have a row in the output table.
    #[arg(long)]
    skip_existing: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            batch_size: self.batch_size,
            source_dir: self.source_dir,
            output_path: self.output,
            max_retries: self.max_retries,
            ocr_page_limit: self.ocr_pages,
            quality_threshold: self.quality_threshold,
            inter_batch_delay_secs: self.batch_delay,
            model: self.model,
            base_url: self.base_url,
            skip_existing: self.skip_existing,
            ..PipelineConfig::default()
        }
    }
}

fn build_engine(config: &PipelineConfig) -> ExtractionEngine {
    let engine = ExtractionEngine::with_default_strategies(config.quality_threshold);

    #[cfg(feature = "ocr")]
    let engine = engine.with_ocr(litsift::pipeline::extraction::OcrFallback {
        renderer: Box::new(litsift::pipeline::extraction::PdfiumRenderer),
        engine: Box::new(litsift::pipeline::extraction::TesseractOcr::new(None, "eng")),
        page_limit: config.ocr_page_limit,
        dpi: litsift::config::DEFAULT_OCR_DPI,
    });

    engine
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();

    let documents = match enumerate_pdfs(&config.source_dir) {
        Ok(documents) => documents,
        Err(e) => {
            // Nothing to do is not a crash; report and leave no state behind.
            error!(error = %e, "No work to do");
            return ExitCode::SUCCESS;
        }
    };

    let client = match OpenRouterClient::from_env(&config.base_url, &config.model) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Model client setup failed");
            return ExitCode::FAILURE;
        }
    };

    let engine = Arc::new(build_engine(&config));
    let extractor = Arc::new(InfoExtractor::new(
        Arc::new(client),
        config.max_retries,
        config.max_input_chars,
    ));
    let store = Arc::new(RecordStore::new(&config.output_path));

    let runner = BatchRunner::new(engine, extractor, config.clone());
    match runner.run(documents, &store).await {
        Ok(stats) => {
            info!(
                total = stats.total_documents,
                successful = stats.successful,
                failed = stats.failed,
                skipped = stats.skipped,
                elapsed_secs = stats.elapsed.as_secs(),
                output = %config.output_path.display(),
                "Run complete"
            );
            for filename in &stats.persist_failures {
                warn!(filename = %filename, "Record could not be persisted");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}
