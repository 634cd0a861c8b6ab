//! Structured information extraction through an external model service.

mod client;
mod extractor;
mod schema;

pub use client::{MockModelClient, ModelClient, OpenRouterClient};
pub use extractor::InfoExtractor;
pub use schema::{response_schema, PaperInfo};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("model service failed after {attempts} attempts: {last_error}")]
    ServiceFailed { attempts: u32, last_error: String },

    #[error("response violates the output schema: {0}")]
    SchemaInvalid(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("model service returned status {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("missing API key: set the {0} environment variable")]
    MissingApiKey(&'static str),
}
