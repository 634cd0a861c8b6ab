//! Bulk literature triage pipeline.
//!
//! Ingests a directory of PDF papers, extracts their text with a
//! multi-strategy engine (OCR as last resort), derives structured metadata
//! through an external model service, and appends one record per document
//! to a shared CSV summary table.

pub mod config;
pub mod document;
pub mod pipeline;
pub mod store;
