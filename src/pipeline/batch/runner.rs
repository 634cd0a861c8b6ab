use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::document::Document;
use crate::pipeline::enrichment::{EnrichmentError, InfoExtractor};
use crate::pipeline::extraction::ExtractionEngine;
use crate::store::{Record, RecordStatus, RecordStore};

use super::stats::{BatchStats, RunStats};
use super::RunError;

/// What one document task reports back to the runner.
struct TaskOutcome {
    filename: String,
    status: RecordStatus,
    persisted: bool,
}

/// Drives the whole run: chunks the document set into batches of
/// `batch_size`, processes each batch concurrently (one task per document,
/// joined before the next batch starts) and sleeps between batches.
///
/// A document failure never stops the run; the document gets a placeholder
/// record and the batch continues.
pub struct BatchRunner {
    engine: Arc<ExtractionEngine>,
    extractor: Arc<InfoExtractor>,
    config: PipelineConfig,
}

impl BatchRunner {
    pub fn new(
        engine: Arc<ExtractionEngine>,
        extractor: Arc<InfoExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            engine,
            extractor,
            config,
        }
    }

    pub async fn run(
        &self,
        mut documents: Vec<Document>,
        store: &Arc<RecordStore>,
    ) -> Result<RunStats, RunError> {
        if documents.is_empty() {
            return Err(RunError::EmptyDocumentSet);
        }

        // Probing the table up front both validates the destination and
        // feeds the optional dedup pass.
        let existing = store.filenames().await?;
        let mut skipped = 0;
        if self.config.skip_existing {
            let before = documents.len();
            documents.retain(|d| !existing.contains(&d.name));
            skipped = before - documents.len();
            if skipped > 0 {
                info!(skipped, "Skipping documents already present in the store");
            }
        }

        let total_documents = documents.len();
        let batch_size = self.config.batch_size.max(1);
        let total_batches = total_documents.div_ceil(batch_size);
        info!(
            total_documents,
            total_batches, batch_size, "Starting batch run"
        );

        let started = Instant::now();
        let mut stats = RunStats {
            total_documents,
            skipped,
            ..RunStats::default()
        };

        for (batch_index, batch) in documents.chunks(batch_size).enumerate() {
            let batch_number = batch_index + 1;
            info!(
                batch = batch_number,
                of = total_batches,
                documents = batch.len(),
                "Processing batch"
            );

            let (batch_stats, persist_failures) =
                self.process_batch(batch_number, batch, store).await;
            stats.successful += batch_stats.successful;
            stats.failed += batch_stats.failed;
            stats.persist_failures.extend(persist_failures);

            info!(
                batch = batch_number,
                successful = batch_stats.successful,
                failed = batch_stats.failed,
                "Batch complete"
            );

            if batch_number < total_batches {
                sleep(Duration::from_secs(self.config.inter_batch_delay_secs)).await;
            }
        }

        stats.persist_failures.sort();
        stats.elapsed = started.elapsed();
        Ok(stats)
    }

    async fn process_batch(
        &self,
        batch_number: usize,
        batch: &[Document],
        store: &Arc<RecordStore>,
    ) -> (BatchStats, Vec<String>) {
        let mut handles = Vec::with_capacity(batch.len());
        for document in batch {
            let engine = Arc::clone(&self.engine);
            let extractor = Arc::clone(&self.extractor);
            let store = Arc::clone(store);
            let filename = document.name.clone();
            let document = document.clone();
            let handle = tokio::spawn(async move {
                process_document(engine, extractor, store, document).await
            });
            handles.push((filename, handle));
        }

        let mut stats = BatchStats {
            batch_number,
            ..BatchStats::default()
        };
        let mut persist_failures = Vec::new();
        for (filename, handle) in handles {
            match handle.await {
                Ok(outcome) => {
                    if outcome.status == RecordStatus::Ok {
                        stats.successful += 1;
                    } else {
                        stats.failed += 1;
                    }
                    if !outcome.persisted {
                        warn!(
                            filename = %outcome.filename,
                            "Record was not persisted and is lost"
                        );
                        persist_failures.push(outcome.filename);
                    }
                }
                Err(e) => {
                    error!(filename = %filename, error = %e, "Document task panicked");
                    stats.failed += 1;
                    // The task died before appending its record; write the
                    // placeholder here so the document still gets a row.
                    let record =
                        Record::placeholder(&filename, RecordStatus::ExtractionFailed);
                    if let Err(e) = store.append(record).await {
                        warn!(filename = %filename, error = %e, "Failed to persist record");
                        persist_failures.push(filename);
                    }
                }
            }
        }
        (stats, persist_failures)
    }
}

async fn process_document(
    engine: Arc<ExtractionEngine>,
    extractor: Arc<InfoExtractor>,
    store: Arc<RecordStore>,
    document: Document,
) -> TaskOutcome {
    let record = build_record(&engine, &extractor, &document).await;
    let status = record.status;
    let filename = document.name.clone();

    let persisted = match store.append(record).await {
        Ok(()) => true,
        Err(e) => {
            warn!(filename = %filename, error = %e, "Failed to persist record");
            false
        }
    };

    info!(
        filename = %filename,
        status = status.as_str(),
        persisted,
        "Document processed"
    );

    TaskOutcome {
        filename,
        status,
        persisted,
    }
}

/// Extraction and enrichment for one document; every failure mode maps to
/// a placeholder record, never an error.
async fn build_record(
    engine: &Arc<ExtractionEngine>,
    extractor: &Arc<InfoExtractor>,
    document: &Document,
) -> Record {
    let engine = Arc::clone(engine);
    let doc = document.clone();
    let extracted = tokio::task::spawn_blocking(move || engine.extract(&doc)).await;

    let outcome = match extracted {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!(filename = %document.name, error = %e, "Extraction failed");
            return Record::placeholder(&document.name, RecordStatus::ExtractionFailed);
        }
        Err(e) => {
            error!(filename = %document.name, error = %e, "Extraction task panicked");
            return Record::placeholder(&document.name, RecordStatus::ExtractionFailed);
        }
    };

    match extractor.extract_info(&outcome.text, &document.name).await {
        Ok(info) => Record::from_payload(&document.name, info),
        Err(EnrichmentError::SchemaInvalid(reason)) => {
            warn!(filename = %document.name, reason = %reason, "Schema-invalid response");
            Record::placeholder(&document.name, RecordStatus::SchemaInvalid)
        }
        Err(e) => {
            warn!(filename = %document.name, error = %e, "Enrichment failed");
            Record::placeholder(&document.name, RecordStatus::ServiceFailed)
        }
    }
}
