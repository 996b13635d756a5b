//! Recursive extraction runner
//!
//! A fixed-size worker pool drains a shared job queue. Every successful
//! extraction is scanned for nested archives, which are enqueued as new
//! jobs, so the queue grows while jobs are in flight. The pool terminates
//! only when the queue is empty *and* no job is in flight; a plain
//! queue-empty check would race with a job that is about to enqueue
//! children, so completion is tracked with an atomic counter.

use crate::archive;
use crate::format;
use crate::job::{ExtractionJob, ExtractionOutcome};
use crate::report::Reporter;
use crate::stats::{Statistics, StatsCollector};
use crate::{Error, Result};
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Options controlling a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Worker pool size
    pub workers: usize,
    /// Maximum nesting depth; `None` is unbounded. A discovered archive
    /// beyond the limit is recorded as failed and left on disk.
    pub max_depth: Option<u32>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            max_depth: None,
        }
    }
}

/// Shared flag that stops new jobs from being enqueued or started.
///
/// In-flight extractions finish; already-queued jobs are drained without
/// processing. Already-written files stay in place.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Message {
    Job(ExtractionJob),
    Shutdown,
}

struct WorkerContext<'a> {
    tx: Sender<Message>,
    in_flight: &'a AtomicUsize,
    stats: &'a StatsCollector,
    reporter: &'a dyn Reporter,
    cancel: &'a CancelFlag,
    max_depth: Option<u32>,
    workers: usize,
}

/// Extract `root_archive` into `target_dir` and every nested archive after
/// it, returning the final statistics.
///
/// Returns `Err` only when the run cannot start at all (the root path is
/// not a file). Per-archive failures are recorded in the statistics and
/// never abort the run.
pub fn run(
    root_archive: &Path,
    target_dir: &Path,
    options: &RunOptions,
    reporter: &dyn Reporter,
    cancel: &CancelFlag,
) -> Result<Statistics> {
    if !root_archive.is_file() {
        return Err(Error::InvalidPath(format!(
            "{:?} is not a file",
            root_archive
        )));
    }

    let stats = StatsCollector::new();
    let in_flight = AtomicUsize::new(0);
    let (tx, rx) = crossbeam_channel::unbounded::<Message>();

    let root_job = ExtractionJob {
        source_path: root_archive.to_path_buf(),
        target_dir: target_dir.to_path_buf(),
        depth: 0,
    };
    in_flight.fetch_add(1, Ordering::SeqCst);
    reporter.on_enqueue(&root_job);
    tx.send(Message::Job(root_job)).expect("queue open");

    let workers = options.workers.max(1);
    thread::scope(|scope| {
        for _ in 0..workers {
            let rx = rx.clone();
            let ctx = WorkerContext {
                tx: tx.clone(),
                in_flight: &in_flight,
                stats: &stats,
                reporter,
                cancel,
                max_depth: options.max_depth,
                workers,
            };
            scope.spawn(move || worker_loop(rx, ctx));
        }
    });

    Ok(stats.snapshot())
}

fn worker_loop(rx: Receiver<Message>, ctx: WorkerContext<'_>) {
    while let Ok(message) = rx.recv() {
        let job = match message {
            Message::Job(job) => job,
            Message::Shutdown => break,
        };

        // A cancelled run drains the queue without processing
        if !ctx.cancel.is_cancelled() {
            process_job(job, &ctx);
        }

        // Queue empty and nothing in flight: the last finisher wakes
        // every worker so the pool can return to the caller.
        if ctx.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            for _ in 0..ctx.workers {
                let _ = ctx.tx.send(Message::Shutdown);
            }
        }
    }
}

fn process_job(job: ExtractionJob, ctx: &WorkerContext<'_>) {
    let kind = format::classify(&job.source_path);
    let started = Instant::now();

    let outcome = match archive::extract(kind, &job.source_path, &job.target_dir) {
        Ok(()) => {
            info!(
                "Extracted {:?} in {:.2?}",
                job.source_path,
                started.elapsed()
            );
            on_success(job, ctx)
        }
        Err(error) => {
            warn!("Failed to extract {:?}: {}", job.source_path, error);
            ExtractionOutcome::failure(job, error)
        }
    };

    ctx.stats.record(&outcome);
    ctx.reporter.on_outcome(&outcome);
}

/// Recursion controller: scan the extracted output, enqueue nested
/// archives, then delete the source. Runs on the worker that extracted
/// the job.
fn on_success(job: ExtractionJob, ctx: &WorkerContext<'_>) -> ExtractionOutcome {
    // A scan that cannot enumerate the output fails the job: deleting
    // the source without knowing every child would lose archives.
    let scan = match scan_target_dir(&job.target_dir) {
        Ok(scan) => scan,
        Err(error) => {
            warn!("Failed to scan {:?}: {}", job.target_dir, error);
            return ExtractionOutcome::failure(job, error);
        }
    };

    // Children are enqueued before the source is touched, so a crash
    // mid-scan never loses a still-present archive.
    let mut claimed = HashSet::new();
    for child in scan.children {
        let child_job = ExtractionJob {
            target_dir: child_target_dir(&child, &mut claimed),
            source_path: child,
            depth: job.depth + 1,
        };

        if ctx.cancel.is_cancelled() {
            continue;
        }

        if let Some(max) = ctx.max_depth {
            if child_job.depth > max {
                warn!(
                    "Skipping {:?}: nesting depth {} exceeds limit {}",
                    child_job.source_path, child_job.depth, max
                );
                let error = Error::DepthLimitExceeded {
                    path: child_job.source_path.clone(),
                    depth: child_job.depth,
                };
                let outcome = ExtractionOutcome::failure(child_job, error);
                ctx.stats.record(&outcome);
                ctx.reporter.on_outcome(&outcome);
                continue;
            }
        }

        ctx.in_flight.fetch_add(1, Ordering::SeqCst);
        ctx.reporter.on_enqueue(&child_job);
        let _ = ctx.tx.send(Message::Job(child_job));
    }

    let mut outcome = ExtractionOutcome::success(job, scan.files, scan.bytes);

    // A cancelled scan may have skipped children; leave the source alone
    if ctx.cancel.is_cancelled() {
        return outcome;
    }

    // Deletion failure is a warning, not a job failure
    match fs::remove_file(&outcome.job.source_path) {
        Ok(()) => {
            outcome.source_deleted = true;
            ctx.reporter.on_delete(&outcome.job.source_path);
        }
        Err(e) => {
            warn!("Could not delete {:?}: {}", outcome.job.source_path, e);
        }
    }

    outcome
}

struct ScanResult {
    files: u64,
    bytes: u64,
    children: Vec<PathBuf>,
}

/// Enumerate everything a job wrote under its fresh target directory:
/// non-archive regular files are counted, nested archives are collected
/// for enqueueing. Any enumeration error is propagated so the caller can
/// refuse to delete the source.
fn scan_target_dir(dir: &Path) -> Result<ScanResult> {
    let mut scan = ScanResult {
        files: 0,
        bytes: 0,
        children: Vec::new(),
    };

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if format::classify(entry.path()).is_archive() {
            scan.children.push(entry.path().to_path_buf());
        } else {
            scan.files += 1;
            scan.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }

    Ok(scan)
}

/// Fresh extraction directory for a nested archive: the archive stem,
/// made unique against whatever the parent extraction already wrote and
/// against same-stem siblings claimed earlier in this scan.
fn child_target_dir(archive: &Path, claimed: &mut HashSet<PathBuf>) -> PathBuf {
    let base = match format::archive_stem(archive) {
        Some(dir) => dir,
        None => archive.with_extension(""),
    };

    let mut candidate = base.clone();
    let mut counter = 1;
    while candidate.exists() || claimed.contains(&candidate) {
        let name = base.file_name().unwrap_or_default().to_string_lossy();
        candidate = base.with_file_name(format!("{}_{}", name, counter));
        counter += 1;
    }

    claimed.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use std::io::Write;
    use tempfile::TempDir;

    fn build_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in files {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_run_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = run(
            &temp.path().join("nope.zip"),
            &temp.path().join("out"),
            &RunOptions::default(),
            &NullReporter,
            &CancelFlag::new(),
        );
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_run_single_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("flat.zip");
        build_zip(&archive, &[("a.txt", b"aaa"), ("b.txt", b"bb")]);

        let out = temp.path().join("out");
        let stats = run(
            &archive,
            &out,
            &RunOptions::default(),
            &NullReporter,
            &CancelFlag::new(),
        )
        .unwrap();

        assert_eq!(stats.archives_processed, 1);
        assert_eq!(stats.files_extracted, 2);
        assert_eq!(stats.bytes_extracted, 5);
        assert_eq!(stats.archives_failed, 0);
        assert_eq!(stats.archives_deleted, 1);
        assert!(out.join("a.txt").exists());
        assert!(!archive.exists());
    }

    #[test]
    fn test_run_unknown_root_records_failure() {
        let temp = TempDir::new().unwrap();
        let bogus = temp.path().join("data.bin");
        fs::write(&bogus, b"payload").unwrap();

        let stats = run(
            &bogus,
            &temp.path().join("out"),
            &RunOptions::default(),
            &NullReporter,
            &CancelFlag::new(),
        )
        .unwrap();

        assert_eq!(stats.archives_processed, 0);
        assert_eq!(stats.archives_failed, 1);
        assert!(bogus.exists());
    }

    #[test]
    fn test_child_target_dir_unique_for_same_stem_siblings() {
        let temp = TempDir::new().unwrap();
        let mut claimed = HashSet::new();

        let first = child_target_dir(&temp.path().join("inner.tar"), &mut claimed);
        let second = child_target_dir(&temp.path().join("inner.zip"), &mut claimed);

        assert_eq!(first, temp.path().join("inner"));
        assert_eq!(second, temp.path().join("inner_1"));
    }

    #[test]
    fn test_child_target_dir_avoids_existing_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("inner")).unwrap();
        let mut claimed = HashSet::new();

        let dir = child_target_dir(&temp.path().join("inner.zip"), &mut claimed);
        assert_eq!(dir, temp.path().join("inner_1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_propagates_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.txt"), b"aaa").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores directory permissions; nothing to assert then
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = scan_target_dir(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_cancelled_run_does_nothing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("flat.zip");
        build_zip(&archive, &[("a.txt", b"aaa")]);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let stats = run(
            &archive,
            &temp.path().join("out"),
            &RunOptions::default(),
            &NullReporter,
            &cancel,
        )
        .unwrap();

        assert_eq!(stats.archives_processed, 0);
        assert_eq!(stats.archives_failed, 0);
        assert!(archive.exists());
    }
}
