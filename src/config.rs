use std::path::PathBuf;

/// Environment variable holding the model-service API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default rendering DPI for the OCR rasterization path.
pub const DEFAULT_OCR_DPI: u32 = 200;

/// Tunables for one pipeline run.
///
/// Defaults mirror the values the pipeline was calibrated with; every field
/// can be overridden from the CLI. The service credential is not part of
/// this struct; it comes from the environment only.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Documents processed concurrently per batch wave.
    pub batch_size: usize,
    /// Directory the PDFs are enumerated from.
    pub source_dir: PathBuf,
    /// Destination CSV table.
    pub output_path: PathBuf,
    /// Model-service attempt ceiling per document.
    pub max_retries: u32,
    /// Pages rasterized for OCR when all text-layer strategies fail.
    pub ocr_page_limit: usize,
    /// Minimum trimmed character count for a strategy's output to be accepted.
    pub quality_threshold: usize,
    /// Pause between batches, pacing outbound request volume.
    pub inter_batch_delay_secs: u64,
    /// Input text budget per model request, in characters.
    pub max_input_chars: usize,
    /// Model identifier sent to the service.
    pub model: String,
    /// OpenAI-compatible service base URL.
    pub base_url: String,
    /// Skip documents whose filename already has a row in the store.
    pub skip_existing: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            source_dir: PathBuf::from("papers"),
            output_path: PathBuf::from("batch_papers_summary.csv"),
            max_retries: 3,
            ocr_page_limit: 5,
            quality_threshold: 100,
            inter_batch_delay_secs: 2,
            max_input_chars: 15_000,
            model: "openai/gpt-4o-mini".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            skip_existing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.ocr_page_limit, 5);
        assert_eq!(config.quality_threshold, 100);
        assert_eq!(config.inter_batch_delay_secs, 2);
        assert_eq!(config.max_input_chars, 15_000);
        assert!(!config.skip_existing);
    }

    #[test]
    fn default_model_and_endpoint() {
        let config = PipelineConfig::default();
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert!(config.base_url.starts_with("https://"));
    }
}
