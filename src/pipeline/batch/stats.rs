use std::time::Duration;

/// Per-batch tally.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchStats {
    pub batch_number: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Whole-run tally.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub total_documents: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Filenames whose record could not be persisted even after retry.
    pub persist_failures: Vec<String>,
    pub elapsed: Duration,
}
