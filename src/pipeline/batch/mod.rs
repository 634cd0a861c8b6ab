//! Batch orchestration: partitions the document set, fans each batch out
//! to concurrent tasks and paces between batches.

mod runner;
mod stats;

pub use runner::BatchRunner;
pub use stats::{BatchStats, RunStats};

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("no documents to process")]
    EmptyDocumentSet,

    #[error("cannot open record store: {0}")]
    Store(#[from] StoreError),
}
