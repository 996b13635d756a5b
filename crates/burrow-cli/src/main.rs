use anyhow::{anyhow, Result};
use burrow_core::{format, CancelFlag, ExtractionOutcome, Reporter, RunOptions, Statistics};
use clap::Parser;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "burrow")]
#[command(author, version, about = "Recursively extract an archive and every archive nested inside it", long_about = None)]
struct Cli {
    /// Root archive to extract
    archive: PathBuf,

    /// Destination directory; output lands in <DEST>/<archive stem>
    dest: PathBuf,

    /// Worker pool size (defaults to the number of CPUs)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Maximum nesting depth; deeper archives are reported, not extracted
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Disable the progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Live progress spinner fed from worker threads
struct ConsoleReporter {
    bar: Option<ProgressBar>,
    archives: AtomicU64,
    files: AtomicU64,
    failed: AtomicU64,
}

impl ConsoleReporter {
    fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{prefix:.bold} {spinner} {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_prefix("burrow");
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };
        Self {
            bar,
            archives: AtomicU64::new(0),
            files: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    fn update_message(&self) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!(
                "{} archives, {} files, {} failed",
                self.archives.load(Ordering::Relaxed),
                self.files.load(Ordering::Relaxed),
                self.failed.load(Ordering::Relaxed),
            ));
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Reporter for ConsoleReporter {
    fn on_outcome(&self, outcome: &ExtractionOutcome) {
        if outcome.is_success() {
            self.archives.fetch_add(1, Ordering::Relaxed);
            self.files
                .fetch_add(outcome.files_extracted, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.update_message();
    }
}

fn print_summary(stats: &Statistics) {
    println!("{:<24} {:>12}", "Metric", "Count");
    println!("{}", "-".repeat(37));
    println!("{:<24} {:>12}", "Archives processed", stats.archives_processed);
    println!("{:<24} {:>12}", "Files extracted", stats.files_extracted);
    println!(
        "{:<24} {:>12}",
        "Bytes extracted",
        HumanBytes(stats.bytes_extracted).to_string()
    );
    println!("{:<24} {:>12}", "Archives failed", stats.archives_failed);
    println!("{:<24} {:>12}", "Archives deleted", stats.archives_deleted);

    if !stats.failures.is_empty() {
        println!();
        println!("Failed to extract:");
        for failure in &stats.failures {
            println!("  {} ({})", failure.path.display(), failure.error);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(stats) => {
            let code = if stats.archives_failed > 0 { 1 } else { 0 };
            process::exit(code);
        }
        Err(e) => {
            // With --quiet no subscriber is installed; write to stderr directly
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> Result<Statistics> {
    let started = Instant::now();

    let name = cli
        .archive
        .file_name()
        .ok_or_else(|| anyhow!("invalid archive path: {:?}", cli.archive))?;
    let stem = format::archive_stem(Path::new(name)).unwrap_or_else(|| PathBuf::from(name));
    let target_dir = cli.dest.join(stem);

    let options = RunOptions {
        workers: cli.workers.unwrap_or_else(|| RunOptions::default().workers),
        max_depth: cli.max_depth,
    };

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nInterrupted, finishing in-flight extractions");
            cancel.cancel();
        })
        .ok();
    }

    info!("Extracting {:?} into {:?}", cli.archive, target_dir);
    let reporter = ConsoleReporter::new(!cli.quiet && !cli.no_progress);
    let stats = burrow_core::run(&cli.archive, &target_dir, &options, &reporter, &cancel)?;
    reporter.finish();

    info!("Extraction complete in {:.2?}", started.elapsed());
    if !cli.quiet {
        print_summary(&stats);
    }

    Ok(stats)
}
