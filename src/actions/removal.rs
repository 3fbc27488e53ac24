//! Deleting redundant copies from a scan result
//!
//! Removal is always a separate, explicit step: scanning never deletes.
//! Every group keeps exactly one survivor chosen by a [`RetentionStrategy`];
//! a failed deletion is recorded and the run moves on.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::retention::{select_survivor, RetentionStrategy};
use crate::core::cancel::CancelToken;
use crate::core::digest::Digest;
use crate::core::error::{DeletionError, FailureKind};
use crate::scanner::duplicate_detector::ScanResult;
use crate::scanner::file_scanner::{same_file, FileEntry};

/// Primitive used to delete files
pub trait FileRemover {
    fn remove(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Whether two paths are links to one file on disk.
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        same_file(a, b)
    }
}

/// Deletes through `std::fs::remove_file`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Survivor and victims for one group, computed without touching disk
#[derive(Debug, Clone, Serialize)]
pub struct RemovalPlan<'a> {
    pub digest: Digest,
    pub survivor: &'a FileEntry,
    pub victims: Vec<&'a FileEntry>,
}

/// A deletion that did not happen
#[derive(Debug, Clone, Serialize)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl DeletionFailure {
    fn from_error(path: &Path, err: &DeletionError) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// What happened to one duplicate group
#[derive(Debug, Clone, Serialize)]
pub struct GroupOutcome {
    pub digest: Digest,
    pub survivor: PathBuf,
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<DeletionFailure>,
    pub bytes_freed: u64,
}

/// Result of a removal run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    pub strategy: RetentionStrategy,
    pub groups: Vec<GroupOutcome>,
    /// Set when cancellation stopped the run before every group was handled
    pub interrupted: bool,
}

impl RemovalReport {
    pub fn deleted_count(&self) -> usize {
        self.groups.iter().map(|g| g.deleted.len()).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.groups.iter().map(|g| g.failed.len()).sum()
    }

    pub fn bytes_freed(&self) -> u64 {
        self.groups.iter().map(|g| g.bytes_freed).sum()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0 && !self.interrupted
    }
}

/// Preview what `remove_duplicates` would do
///
/// # Arguments
/// * `scan` - Scan result to plan against
/// * `strategy` - Survivor selection rule
///
/// # Returns
/// One plan per group, in scan order
pub fn plan_removal(scan: &ScanResult, strategy: RetentionStrategy) -> Vec<RemovalPlan<'_>> {
    scan.groups
        .iter()
        .map(|group| {
            let survivor = select_survivor(group, strategy);
            let victims = group
                .members()
                .iter()
                .filter(|m| !std::ptr::eq(*m, survivor))
                .collect();
            RemovalPlan {
                digest: *group.digest(),
                survivor,
                victims,
            }
        })
        .collect()
}

/// Delete every member of each group except its survivor
///
/// # Arguments
/// * `scan` - Scan result whose groups should be deduplicated
/// * `strategy` - Survivor selection rule
///
/// # Returns
/// Per-group record of deleted and failed paths
pub fn remove_duplicates(scan: &ScanResult, strategy: RetentionStrategy) -> RemovalReport {
    remove_duplicates_with(scan, strategy, &FsRemover, &CancelToken::new())
}

/// [`remove_duplicates`] with a custom delete primitive and cancellation
///
/// Groups are processed in order, one file at a time, so reports are
/// reproducible. Cancellation is checked before each deletion.
pub fn remove_duplicates_with<R: FileRemover + ?Sized>(
    scan: &ScanResult,
    strategy: RetentionStrategy,
    remover: &R,
    cancel: &CancelToken,
) -> RemovalReport {
    let mut report = RemovalReport {
        strategy,
        ..RemovalReport::default()
    };

    'groups: for plan in plan_removal(scan, strategy) {
        if cancel.is_cancelled() {
            report.interrupted = true;
            break;
        }

        let mut outcome = GroupOutcome {
            digest: plan.digest,
            survivor: plan.survivor.path.clone(),
            deleted: Vec::new(),
            failed: Vec::new(),
            bytes_freed: 0,
        };

        // At least one copy must remain on disk.
        if !remover.exists(&plan.survivor.path) {
            for victim in &plan.victims {
                let err = DeletionError::SurvivorMissing {
                    path: victim.path.clone(),
                    survivor: plan.survivor.path.clone(),
                };
                outcome.failed.push(DeletionFailure::from_error(&victim.path, &err));
            }
            report.groups.push(outcome);
            continue;
        }

        for victim in &plan.victims {
            if cancel.is_cancelled() {
                report.interrupted = true;
                report.groups.push(outcome);
                break 'groups;
            }
            // Deleting a link to the survivor could take the only copy with it.
            if remover.same_file(&victim.path, &plan.survivor.path) {
                let err = DeletionError::SameFileAsSurvivor {
                    path: victim.path.clone(),
                    survivor: plan.survivor.path.clone(),
                };
                outcome.failed.push(DeletionFailure::from_error(&victim.path, &err));
                continue;
            }
            match remover.remove(&victim.path) {
                Ok(()) => {
                    outcome.deleted.push(victim.path.clone());
                    outcome.bytes_freed += victim.size;
                }
                Err(e) => {
                    let err = DeletionError::from_io(&victim.path, e);
                    outcome.failed.push(DeletionFailure::from_error(&victim.path, &err));
                }
            }
        }

        report.groups.push(outcome);
    }

    report
}
