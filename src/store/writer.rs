//! Single-writer front end for the CSV table.
//!
//! The table's append is a full read-modify-rewrite, so two concurrent
//! writers would clobber each other's rows. All writes therefore funnel
//! through one async mutex; the blocking file work runs on the blocking
//! pool. A failed rewrite is retried once before the error surfaces.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::warn;

use super::record::Record;
use super::table::CsvTable;
use super::StoreError;

pub struct RecordStore {
    table: Arc<CsvTable>,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: &Path) -> Self {
        Self {
            table: Arc::new(CsvTable::new(path)),
            write_lock: Mutex::new(()),
        }
    }

    /// Stamp the record and append it, serialized against other writers.
    pub async fn append(&self, mut record: Record) -> Result<(), StoreError> {
        record.processed_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let _guard = self.write_lock.lock().await;
        match self.blocking_append(record.clone()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    filename = %record.filename,
                    error = %e,
                    "Store append failed, retrying once"
                );
                self.blocking_append(record).await
            }
        }
    }

    /// Filenames already present in the table.
    pub async fn filenames(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let table = Arc::clone(&self.table);
        let records = tokio::task::spawn_blocking(move || table.load())
            .await
            .map_err(join_to_io)??;
        Ok(records.into_iter().map(|r| r.filename).collect())
    }

    async fn blocking_append(&self, record: Record) -> Result<(), StoreError> {
        let table = Arc::clone(&self.table);
        tokio::task::spawn_blocking(move || table.append(&record))
            .await
            .map_err(join_to_io)?
    }
}

fn join_to_io(e: tokio::task::JoinError) -> StoreError {
    StoreError::Io(std::io::Error::other(e))
}
