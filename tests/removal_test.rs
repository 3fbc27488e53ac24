//! Integration tests for duplicate removal
//!
//! Runs full scan-then-remove cycles against temporary trees and checks
//! what is left on disk and what the report says.

use dedup_scanner::prelude::*;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tempfile::TempDir;

/// Remover that refuses to delete one file name
struct StubbornRemover {
    keep_name: &'static str,
}

impl FileRemover for StubbornRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        if path.file_name().and_then(|n| n.to_str()) == Some(self.keep_name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file is locked"));
        }
        fs::remove_file(path)
    }
}

/// Remover that deletes normally, then cancels the run after its first delete
struct CancellingRemover {
    cancel: CancelToken,
}

impl FileRemover for CancellingRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)?;
        self.cancel.cancel();
        Ok(())
    }
}

#[test]
fn test_hello_world_removal_keeps_first_seen() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a.txt");
    let b = temp_dir.path().join("b.txt");
    let c = temp_dir.path().join("c.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();
    fs::write(&c, "world").unwrap();

    let scan = find_duplicates(temp_dir.path()).unwrap();
    let report = remove_duplicates(&scan, RetentionStrategy::KeepFirstSeen);

    assert!(a.exists());
    assert!(!b.exists());
    assert!(c.exists());
    assert_eq!(report.deleted_count(), 1);
    assert!(report.groups[0].survivor.ends_with("a.txt"));
    assert!(report.groups[0].deleted[0].ends_with("b.txt"));
    assert!(report.all_succeeded());
}

#[test]
fn test_three_copies_leave_one() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["one", "two", "three"] {
        fs::write(temp_dir.path().join(name), "identical bytes").unwrap();
    }

    let scan = find_duplicates(temp_dir.path()).unwrap();
    let report = remove_duplicates(&scan, RetentionStrategy::KeepFirstSeen);

    let remaining = fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(remaining, 1);
    assert_eq!(report.deleted_count(), 2);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.bytes_freed(), 2 * "identical bytes".len() as u64);
    // "one" < "three" < "two" in traversal order
    assert!(temp_dir.path().join("one").exists());
}

#[test]
fn test_keep_oldest_uses_mtime() {
    let temp_dir = TempDir::new().unwrap();
    let newer = temp_dir.path().join("a_newer.txt");
    let older = temp_dir.path().join("b_older.txt");
    fs::write(&newer, "same").unwrap();
    fs::write(&older, "same").unwrap();
    set_file_mtime(&newer, FileTime::from_unix_time(2_000_000_000, 0)).unwrap();
    set_file_mtime(&older, FileTime::from_unix_time(1_000_000_000, 0)).unwrap();

    let scan = find_duplicates(temp_dir.path()).unwrap();
    assert_eq!(
        select_survivor(&scan.groups[0], RetentionStrategy::KeepOldest).path,
        older.canonicalize().unwrap()
    );

    let report = remove_duplicates(&scan, RetentionStrategy::KeepOldest);

    assert!(older.exists());
    assert!(!newer.exists());
    assert_eq!(report.strategy, RetentionStrategy::KeepOldest);
}

#[test]
fn test_keep_shortest_path() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("archive").join("2019");
    fs::create_dir_all(&nested).unwrap();
    let short = temp_dir.path().join("z.txt");
    let long = nested.join("a.txt");
    fs::write(&short, "photo").unwrap();
    fs::write(&long, "photo").unwrap();

    let scan = find_duplicates(temp_dir.path()).unwrap();
    let report = remove_duplicates(&scan, RetentionStrategy::KeepShortestPath);

    assert!(short.exists());
    assert!(!long.exists());
    assert_eq!(report.deleted_count(), 1);
}

#[test]
fn test_failed_deletion_does_not_abort() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a1"), "first").unwrap();
    fs::write(temp_dir.path().join("a2"), "first").unwrap();
    fs::write(temp_dir.path().join("b1"), "second").unwrap();
    fs::write(temp_dir.path().join("b2"), "second").unwrap();

    let scan = find_duplicates(temp_dir.path()).unwrap();
    let report = remove_duplicates_with(
        &scan,
        RetentionStrategy::KeepFirstSeen,
        &StubbornRemover { keep_name: "a2" },
        &CancelToken::new(),
    );

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.deleted_count(), 1);
    let failure = &report.groups[0].failed[0];
    assert!(failure.path.ends_with("a2"));
    assert_eq!(failure.kind, FailureKind::PermissionDenied);
    assert!(temp_dir.path().join("a2").exists());
    assert!(!temp_dir.path().join("b2").exists());
}

#[test]
fn test_already_deleted_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a"), "data").unwrap();
    fs::write(temp_dir.path().join("b"), "data").unwrap();

    let scan = find_duplicates(temp_dir.path()).unwrap();
    fs::remove_file(temp_dir.path().join("b")).unwrap();
    let report = remove_duplicates(&scan, RetentionStrategy::KeepFirstSeen);

    assert_eq!(report.deleted_count(), 0);
    assert_eq!(report.groups[0].failed[0].kind, FailureKind::NotFound);
}

#[test]
fn test_vanished_survivor_keeps_remaining_copy() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a"), "data").unwrap();
    fs::write(temp_dir.path().join("b"), "data").unwrap();

    let scan = find_duplicates(temp_dir.path()).unwrap();
    fs::remove_file(temp_dir.path().join("a")).unwrap();
    let report = remove_duplicates(&scan, RetentionStrategy::KeepFirstSeen);

    assert!(temp_dir.path().join("b").exists());
    assert_eq!(report.groups[0].failed[0].kind, FailureKind::SurvivorMissing);
}

#[test]
fn test_plan_matches_removal() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["x", "y", "z"] {
        fs::write(temp_dir.path().join(name), "dup").unwrap();
    }

    let scan = find_duplicates(temp_dir.path()).unwrap();
    let plans = plan_removal(&scan, RetentionStrategy::KeepFirstSeen);
    let planned: Vec<_> = plans[0].victims.iter().map(|f| f.path.clone()).collect();
    let survivor = plans[0].survivor.path.clone();

    // Planning is side-effect free
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 3);

    let report = remove_duplicates(&scan, RetentionStrategy::KeepFirstSeen);
    assert_eq!(report.groups[0].deleted, planned);
    assert_eq!(report.groups[0].survivor, survivor);
}

#[test]
fn test_cancel_mid_removal_stops_after_current_file() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["a1", "a2", "a3"] {
        fs::write(temp_dir.path().join(name), "first").unwrap();
    }
    for name in ["b1", "b2"] {
        fs::write(temp_dir.path().join(name), "second").unwrap();
    }

    let scan = find_duplicates(temp_dir.path()).unwrap();
    assert_eq!(scan.groups.len(), 2);

    let cancel = CancelToken::new();
    let remover = CancellingRemover {
        cancel: cancel.clone(),
    };
    let report = remove_duplicates_with(&scan, RetentionStrategy::KeepFirstSeen, &remover, &cancel);

    assert!(report.interrupted);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].deleted.len(), 1);
    assert!(report.groups[0].deleted[0].ends_with("a2"));
    assert!(report.groups[0].failed.is_empty());
    assert_eq!(report.bytes_freed(), "first".len() as u64);

    assert!(!temp_dir.path().join("a2").exists());
    for name in ["a1", "a3", "b1", "b2"] {
        assert!(temp_dir.path().join(name).exists(), "{} was touched", name);
    }
}

#[cfg(unix)]
#[test]
fn test_followed_symlink_never_costs_the_target() {
    let temp_dir = TempDir::new().unwrap();
    let real = temp_dir.path().join("real.txt");
    let alias = temp_dir.path().join("alias.txt");
    fs::write(&real, "only copy").unwrap();
    std::os::unix::fs::symlink(&real, &alias).unwrap();

    let scan = DuplicateScanner::new(ScanOptions {
        follow_symlinks: true,
        ..ScanOptions::default()
    })
    .scan(temp_dir.path())
    .unwrap();
    assert!(scan.is_empty());
    assert_eq!(scan.links_skipped, 1);

    let report = remove_duplicates(&scan, RetentionStrategy::KeepFirstSeen);

    assert_eq!(report.deleted_count(), 0);
    assert_eq!(fs::read_to_string(&real).unwrap(), "only copy");
    assert_eq!(fs::read_to_string(&alias).unwrap(), "only copy");
}

#[cfg(unix)]
#[test]
fn test_link_to_survivor_is_not_deleted() {
    let temp_dir = TempDir::new().unwrap();
    let real = temp_dir.path().join("real.txt");
    let alias = temp_dir.path().join("alias.txt");
    fs::write(&real, "only copy").unwrap();
    std::os::unix::fs::symlink(&real, &alias).unwrap();

    // A group built outside the scanner, with the link listed first
    let size = "only copy".len() as u64;
    let group = DuplicateGroup::new(
        Digest::of_bytes(b"only copy"),
        vec![
            FileEntry::new(alias.clone(), size, SystemTime::now()),
            FileEntry::new(real.clone(), size, SystemTime::now()),
        ],
    )
    .unwrap();
    let scan = ScanResult {
        groups: vec![group],
        ..ScanResult::default()
    };

    let report = remove_duplicates(&scan, RetentionStrategy::KeepFirstSeen);

    assert!(report.groups[0].survivor.ends_with("alias.txt"));
    assert_eq!(report.deleted_count(), 0);
    assert_eq!(report.groups[0].failed[0].kind, FailureKind::SameFileAsSurvivor);
    assert_eq!(fs::read_to_string(&real).unwrap(), "only copy");
}
