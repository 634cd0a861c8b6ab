//! Append-only record store backing the run summary table.

mod record;
mod table;
mod writer;

pub use record::{Record, RecordStatus};
pub use table::CsvTable;
pub use writer::RecordStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("categories column is not a valid JSON array: {0}")]
    Categories(#[from] serde_json::Error),

    #[error("unknown record status '{0}'")]
    UnknownStatus(String),
}
