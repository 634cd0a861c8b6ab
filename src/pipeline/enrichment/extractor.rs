//! Retry loop and payload parsing around the model client.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::client::ModelClient;
use super::schema::PaperInfo;
use super::EnrichmentError;

const SYSTEM_PROMPT: &str = "You are a scientific paper analysis assistant. \
If information is not available, use empty string for text fields and empty array for categories.";

/// Derives a [`PaperInfo`] from extracted document text.
///
/// Transport and service errors are retried with exponential backoff
/// (1s, 2s, 4s after the first, second and third failures). A well-formed
/// HTTP response whose body violates the schema is a contract violation
/// and is not retried.
pub struct InfoExtractor {
    client: Arc<dyn ModelClient>,
    max_retries: u32,
    max_input_chars: usize,
}

impl InfoExtractor {
    pub fn new(client: Arc<dyn ModelClient>, max_retries: u32, max_input_chars: usize) -> Self {
        Self {
            client,
            max_retries,
            max_input_chars,
        }
    }

    pub async fn extract_info(
        &self,
        text: &str,
        document_name: &str,
    ) -> Result<PaperInfo, EnrichmentError> {
        let user_prompt = self.build_user_prompt(text);
        let mut last_error = String::new();

        for attempt in 0..self.max_retries {
            debug!(
                document = document_name,
                attempt = attempt + 1,
                "Requesting structured extraction"
            );
            match self
                .client
                .complete_structured(SYSTEM_PROMPT, &user_prompt)
                .await
            {
                Ok(content) => return parse_payload(&content),
                Err(e) => {
                    warn!(
                        document = document_name,
                        attempt = attempt + 1,
                        error = %e,
                        "Model request failed"
                    );
                    last_error = e.to_string();
                    tokio::time::sleep(Duration::from_secs(1u64 << attempt)).await;
                }
            }
        }

        Err(EnrichmentError::ServiceFailed {
            attempts: self.max_retries,
            last_error,
        })
    }

    fn build_user_prompt(&self, text: &str) -> String {
        let truncated: String = text.chars().take(self.max_input_chars).collect();
        format!("Extract paper information from: {truncated}")
    }
}

fn parse_payload(content: &str) -> Result<PaperInfo, EnrichmentError> {
    serde_json::from_str(content).map_err(|e| EnrichmentError::SchemaInvalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::client::MockModelClient;
    use super::*;

    fn valid_payload() -> &'static str {
        r#"{
            "title": "A Study",
            "abstract": "We study things.",
            "method": "Survey",
            "objectives": "Understand things",
            "categories": ["survey"],
            "summary": "Things were studied."
        }"#
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let client = Arc::new(MockModelClient::failing_first(valid_payload(), 2));
        let extractor = InfoExtractor::new(client.clone(), 3, 15_000);

        let info = extractor.extract_info("some text", "doc.pdf").await.unwrap();
        assert_eq!(info.title, "A Study");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fail_with_last_error() {
        let client = Arc::new(MockModelClient::always_failing());
        let extractor = InfoExtractor::new(client.clone(), 3, 15_000);

        let start = tokio::time::Instant::now();
        let err = extractor.extract_info("text", "doc.pdf").await.unwrap_err();
        match err {
            EnrichmentError::ServiceFailed {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.calls(), 3);
        // Backoff schedule 1s + 2s + 4s under paused time.
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn schema_violation_is_not_retried() {
        let client = Arc::new(MockModelClient::new("{\"unexpected\": true}"));
        let extractor = InfoExtractor::new(client.clone(), 3, 15_000);

        let err = extractor.extract_info("text", "doc.pdf").await.unwrap_err();
        assert!(matches!(err, EnrichmentError::SchemaInvalid(_)));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn input_is_truncated_to_budget() {
        let client = Arc::new(MockModelClient::new(valid_payload()));
        let extractor = InfoExtractor::new(client.clone(), 3, 50);

        let long_text = "a".repeat(500);
        extractor.extract_info(&long_text, "doc.pdf").await.unwrap();

        let prompt = client.last_user_prompt().unwrap();
        let prefix = "Extract paper information from: ";
        assert!(prompt.starts_with(prefix));
        assert_eq!(prompt.chars().count(), prefix.chars().count() + 50);
    }
}
