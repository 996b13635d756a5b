//! Reporter trait for progress observation
//!
//! The runner emits events through this trait; the console rendering lives
//! in the CLI crate. Implementations must be shareable across worker
//! threads.

use crate::job::{ExtractionJob, ExtractionOutcome};
use std::path::Path;

/// Observer for job-level events during a run.
///
/// All methods have no-op defaults, so an implementation only overrides
/// what it cares about.
pub trait Reporter: Send + Sync {
    /// A job was added to the queue (root job or discovered child)
    fn on_enqueue(&self, _job: &ExtractionJob) {}

    /// A job finished, successfully or not
    fn on_outcome(&self, _outcome: &ExtractionOutcome) {}

    /// A processed source archive was deleted
    fn on_delete(&self, _path: &Path) {}
}

/// Reporter that ignores everything
pub struct NullReporter;

impl Reporter for NullReporter {}
