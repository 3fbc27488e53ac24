//! Report writing functionality

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::actions::removal::{plan_removal, RemovalReport};
use crate::actions::retention::RetentionStrategy;
use crate::scanner::duplicate_detector::ScanResult;

/// Render a scan result as plain text
///
/// # Arguments
/// * `out` - Destination writer
/// * `scan` - Scan result to describe
/// * `strategy` - Strategy used to mark the survivor of each group
pub fn render_scan_report<W: Write>(
    out: &mut W,
    scan: &ScanResult,
    strategy: RetentionStrategy,
) -> Result<()> {
    writeln!(out, "Duplicate Scan Report")?;
    writeln!(out, "=====================")?;
    writeln!(out)?;

    writeln!(out, "Summary Statistics:")?;
    writeln!(out, "-------------------")?;
    writeln!(out, "  Files scanned: {}", scan.files_scanned)?;
    writeln!(out, "  Files hashed: {}", scan.files_hashed)?;
    if scan.links_skipped > 0 {
        writeln!(out, "  Links to already listed files: {}", scan.links_skipped)?;
    }
    writeln!(out, "  Duplicate groups: {}", scan.groups.len())?;
    writeln!(out, "  Redundant files: {}", scan.duplicate_count())?;
    writeln!(out, "  Reclaimable bytes: {}", scan.wasted_bytes())?;
    writeln!(out, "  Warnings: {}", scan.warnings.len())?;
    writeln!(out, "  Retention strategy: {}", strategy)?;
    if scan.interrupted {
        writeln!(out, "  Scan interrupted: results are partial")?;
    }
    writeln!(out)?;

    if !scan.groups.is_empty() {
        writeln!(out, "Duplicate Files:")?;
        writeln!(out, "----------------")?;
        for (idx, plan) in plan_removal(scan, strategy).iter().enumerate() {
            let hex = plan.digest.to_hex();
            writeln!(out, "  Group {} (Hash: {}...):", idx + 1, &hex[..16])?;
            writeln!(out, "    Files ({} copies, {} bytes each):", plan.victims.len() + 1, plan.survivor.size)?;
            writeln!(out, "      [KEEP] {}", plan.survivor.path.display())?;
            for victim in &plan.victims {
                writeln!(out, "      [DUP]  {}", victim.path.display())?;
            }
            writeln!(out)?;
        }
    }

    if !scan.warnings.is_empty() {
        writeln!(out, "Warnings:")?;
        writeln!(out, "---------")?;
        for warning in &scan.warnings {
            writeln!(out, "  {}", warning.message)?;
        }
    }

    Ok(())
}

/// Render a removal report as plain text
pub fn render_removal_report<W: Write>(out: &mut W, report: &RemovalReport) -> Result<()> {
    writeln!(out, "Duplicate Removal Report")?;
    writeln!(out, "========================")?;
    writeln!(out)?;
    writeln!(out, "  Retention strategy: {}", report.strategy)?;
    writeln!(out, "  Groups processed: {}", report.groups.len())?;
    writeln!(out, "  Files deleted: {}", report.deleted_count())?;
    writeln!(out, "  Deletions failed: {}", report.failed_count())?;
    writeln!(out, "  Bytes freed: {}", report.bytes_freed())?;
    if report.interrupted {
        writeln!(out, "  Removal interrupted: remaining groups untouched")?;
    }
    writeln!(out)?;

    for (idx, group) in report.groups.iter().enumerate() {
        writeln!(out, "  Group {} (Hash: {}...):", idx + 1, &group.digest.to_hex()[..16])?;
        writeln!(out, "      [KEEP]    {}", group.survivor.display())?;
        for path in &group.deleted {
            writeln!(out, "      [DELETED] {}", path.display())?;
        }
        for failure in &group.failed {
            writeln!(out, "      [FAILED]  {} ({})", failure.path.display(), failure.message)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Write a plain-text scan report to a file
pub fn write_scan_report(
    output_path: &Path,
    scan: &ScanResult,
    strategy: RetentionStrategy,
) -> Result<()> {
    let mut file = create(output_path)?;
    render_scan_report(&mut file, scan, strategy)?;
    file.flush()?;
    Ok(())
}

/// Write a plain-text removal report to a file
pub fn write_removal_report(output_path: &Path, report: &RemovalReport) -> Result<()> {
    let mut file = create(output_path)?;
    render_removal_report(&mut file, report)?;
    file.flush()?;
    Ok(())
}

/// Write any report as pretty-printed JSON
pub fn write_json_report<T: Serialize + ?Sized>(output_path: &Path, value: &T) -> Result<()> {
    let mut file = create(output_path)?;
    serde_json::to_writer_pretty(&mut file, value)
        .with_context(|| format!("Failed to serialize report to {}", output_path.display()))?;
    writeln!(file)?;
    file.flush()?;
    Ok(())
}

fn create(output_path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create report file {}", output_path.display()))?;
    Ok(BufWriter::new(file))
}
