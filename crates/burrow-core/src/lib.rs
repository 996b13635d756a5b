//! Burrow - recursive nested-archive extraction library
//!
//! This library extracts an archive and every archive discovered inside the
//! extracted output, recursively, on a small worker pool. Originals that
//! extracted cleanly are deleted; failures are recorded and left on disk.

pub mod archive;
pub mod error;
pub mod format;
pub mod job;
pub mod report;
pub mod runner;
pub mod stats;

pub use error::{Error, Result};

// Re-export commonly used types
pub use format::{classify, ArchiveKind};
pub use job::{ExtractionJob, ExtractionOutcome};
pub use report::{NullReporter, Reporter};
pub use runner::{run, CancelFlag, RunOptions};
pub use stats::{FailedArchive, Statistics, StatsCollector};
