use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Builder;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use dedup_scanner::prelude::*;
use dedup_scanner::reporting::render_scan_report;

#[derive(Parser)]
#[command(name = "dedup_scanner")]
#[command(about = "Find and remove duplicate files by content digest", long_about = None)]
struct Cli {
    /// Directory to scan recursively
    directory: PathBuf,

    /// Which copy of each duplicate group to keep
    #[arg(short, long, value_enum, default_value_t = RetentionStrategy::KeepFirstSeen)]
    strategy: RetentionStrategy,

    /// Delete redundant copies (asks for confirmation unless --yes)
    #[arg(long)]
    delete: bool,

    /// Skip the deletion confirmation prompt
    #[arg(short, long, requires = "delete")]
    yes: bool,

    /// Follow symbolic links while scanning
    #[arg(long)]
    follow_symlinks: bool,

    /// Only hash files whose size matches another file
    #[arg(long)]
    size_prefilter: bool,

    /// Number of parallel hashing threads (default: number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Write a plain-text report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON report to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Run in batch mode (no progress spinner, no prompts)
    #[arg(long)]
    batch: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Ctrl-C stops work between files
    let cancel = CancelToken::new();
    let cancel_flag = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nShutdown requested. Finishing files in flight...");
        cancel_flag.cancel();
    })
    .context("Error setting Ctrl-C handler")?;

    if let Some(workers) = cli.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to build thread pool")?;
    }
    log::debug!("Using {} worker thread(s)", rayon::current_num_threads());

    let options = ScanOptions {
        follow_symlinks: cli.follow_symlinks,
        size_prefilter: cli.size_prefilter,
        cancel: cancel.clone(),
    };

    let spinner = if cli.batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb.set_message(format!("Scanning {}", cli.directory.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let scan = DuplicateScanner::new(options)
        .scan(&cli.directory)
        .with_context(|| format!("Failed to scan {}", cli.directory.display()))?;
    spinner.finish_and_clear();

    for warning in &scan.warnings {
        log::warn!("Skipped {}: {}", warning.path.display(), warning.message);
    }
    if scan.links_skipped > 0 {
        log::debug!(
            "Skipped {} hard link(s) or followed symlink(s) to files already listed",
            scan.links_skipped
        );
    }
    if scan.interrupted {
        log::warn!("Scan interrupted; results cover only the files processed");
    }

    let stdout = io::stdout();
    render_scan_report(&mut stdout.lock(), &scan, cli.strategy)?;

    if let Some(ref output) = cli.output {
        write_scan_report(output, &scan, cli.strategy)?;
        log::info!("Text report saved to {}", output.display());
    }

    if !cli.delete {
        if let Some(ref json) = cli.json {
            write_json_report(json, &scan)?;
            log::info!("JSON report saved to {}", json.display());
        }
        return Ok(());
    }

    if scan.is_empty() {
        println!("No duplicates to remove.");
        return Ok(());
    }
    if scan.interrupted {
        bail!("Refusing to delete from an interrupted scan");
    }
    if !cli.yes {
        if cli.batch {
            bail!("--delete in batch mode requires --yes");
        }
        if !confirm(scan.duplicate_count())? {
            println!("Nothing deleted.");
            return Ok(());
        }
    }

    let report = remove_duplicates_with(&scan, cli.strategy, &FsRemover, &cancel);
    for group in &report.groups {
        for path in &group.deleted {
            log::debug!("Deleted {}", path.display());
        }
        for failure in &group.failed {
            log::warn!("Could not delete {}: {}", failure.path.display(), failure.message);
        }
    }
    log::info!(
        "Deleted {} file(s), {} failed, {} bytes freed",
        report.deleted_count(),
        report.failed_count(),
        report.bytes_freed()
    );

    println!("Deleted {} duplicate file(s)", report.deleted_count());
    if report.failed_count() > 0 {
        println!("Failed to delete {} file(s)", report.failed_count());
    }

    if let Some(ref output) = cli.output {
        write_removal_report(&removal_report_path(output), &report)?;
    }
    if let Some(ref json) = cli.json {
        write_json_report(json, &serde_json::json!({ "scan": &scan, "removal": &report }))?;
        log::info!("JSON report saved to {}", json.display());
    }

    Ok(())
}

/// RUST_LOG wins when set; otherwise the CLI flags pick the level.
fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        let level = if quiet {
            LevelFilter::Error
        } else {
            match verbose {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };
        builder.filter_level(level);
    }
    builder.format_timestamp(None).init();
}

fn confirm(count: usize) -> Result<bool> {
    print!("Delete {} duplicate file(s)? [y/N] ", count);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn removal_report_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".removal");
    PathBuf::from(name)
}
