//! Extraction job and outcome types

use crate::Error;
use std::path::PathBuf;

/// One unit of work: extract `source_path` into `target_dir`.
///
/// Created once by the runner, consumed exactly once by a worker.
/// A failed job is never retried.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    /// Archive file to extract
    pub source_path: PathBuf,
    /// Directory to extract into (created if absent)
    pub target_dir: PathBuf,
    /// Nesting level; the root archive is depth 0
    pub depth: u32,
}

/// Result of processing one job, recorded exactly once into statistics
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub job: ExtractionJob,
    /// Non-archive regular files written by this job
    pub files_extracted: u64,
    /// Bytes of those files
    pub bytes_extracted: u64,
    /// `None` on success, the failure otherwise
    pub error: Option<Error>,
    /// Whether the source archive was deleted after success
    pub source_deleted: bool,
}

impl ExtractionOutcome {
    pub fn success(job: ExtractionJob, files_extracted: u64, bytes_extracted: u64) -> Self {
        Self {
            job,
            files_extracted,
            bytes_extracted,
            error: None,
            source_deleted: false,
        }
    }

    pub fn failure(job: ExtractionJob, error: Error) -> Self {
        Self {
            job,
            files_extracted: 0,
            bytes_extracted: 0,
            error: Some(error),
            source_deleted: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
