//! Run-wide extraction statistics

use crate::job::ExtractionOutcome;
use std::path::PathBuf;
use std::sync::Mutex;

/// A failed archive path with its error description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArchive {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Archives that extracted successfully
    pub archives_processed: u64,
    /// Non-archive regular files written
    pub files_extracted: u64,
    /// Bytes of those files
    pub bytes_extracted: u64,
    /// Archives that failed to extract
    pub archives_failed: u64,
    /// Source archives deleted after successful extraction
    pub archives_deleted: u64,
    /// Every failed archive with its error
    pub failures: Vec<FailedArchive>,
}

/// Lock-guarded accumulator shared by all workers.
///
/// Explicitly passed rather than process-global so the runner stays
/// testable and can execute several runs in one process.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<Statistics>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one outcome into the accumulator. Each outcome is recorded
    /// exactly once by the worker that produced it.
    pub fn record(&self, outcome: &ExtractionOutcome) {
        let mut stats = self.inner.lock().expect("stats lock poisoned");
        match &outcome.error {
            None => {
                stats.archives_processed += 1;
                stats.files_extracted += outcome.files_extracted;
                stats.bytes_extracted += outcome.bytes_extracted;
                if outcome.source_deleted {
                    stats.archives_deleted += 1;
                }
            }
            Some(error) => {
                stats.archives_failed += 1;
                stats.failures.push(FailedArchive {
                    path: outcome.job.source_path.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    /// Consistent read of all counters at this point in the run
    pub fn snapshot(&self) -> Statistics {
        self.inner.lock().expect("stats lock poisoned").clone()
    }
}
