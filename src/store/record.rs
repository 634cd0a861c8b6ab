//! One row of the summary table.

use serde::{Deserialize, Serialize};

use crate::pipeline::enrichment::PaperInfo;

use super::StoreError;

/// Outcome marker for a processed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Ok,
    ExtractionFailed,
    ServiceFailed,
    SchemaInvalid,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Ok => "ok",
            RecordStatus::ExtractionFailed => "extraction_failed",
            RecordStatus::ServiceFailed => "service_failed",
            RecordStatus::SchemaInvalid => "schema_invalid",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "ok" => Ok(RecordStatus::Ok),
            "extraction_failed" => Ok(RecordStatus::ExtractionFailed),
            "service_failed" => Ok(RecordStatus::ServiceFailed),
            "schema_invalid" => Ok(RecordStatus::SchemaInvalid),
            other => Err(StoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// One document's row. `processed_at` is stamped by the store at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub filename: String,
    pub title: String,
    pub abstract_text: String,
    pub method: String,
    pub objectives: String,
    pub categories: Vec<String>,
    pub summary: String,
    pub status: RecordStatus,
    pub processed_at: String,
}

impl Record {
    /// Successful row from an extracted payload.
    pub fn from_payload(filename: &str, info: PaperInfo) -> Self {
        Self {
            filename: filename.to_string(),
            title: info.title,
            abstract_text: info.abstract_text,
            method: info.method,
            objectives: info.objectives,
            categories: info.categories,
            summary: info.summary,
            status: RecordStatus::Ok,
            processed_at: String::new(),
        }
    }

    /// Failure row: all content fields empty, only the status tells why.
    pub fn placeholder(filename: &str, status: RecordStatus) -> Self {
        Self {
            filename: filename.to_string(),
            title: String::new(),
            abstract_text: String::new(),
            method: String::new(),
            objectives: String::new(),
            categories: Vec::new(),
            summary: String::new(),
            status,
            processed_at: String::new(),
        }
    }
}
