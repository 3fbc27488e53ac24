//! Duplicate Scanner Library
//!
//! Content-addressable duplicate file detection: walk a directory tree,
//! fingerprint every regular file with SHA-256, group identical content and
//! remove redundant copies under an explicit retention strategy.
//!
//! Scanning is read-only. Deletion is a separate call on the scan result.

pub mod actions;
pub mod core;
pub mod scanner;
pub mod reporting;

pub use crate::core::digest;
pub use crate::scanner::duplicate_detector;
pub use crate::reporting::report_writer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{
        plan_removal, remove_duplicates, remove_duplicates_with, select_survivor, FileRemover, FsRemover,
        RemovalReport, RetentionStrategy,
    };
    pub use crate::core::{
        compute_digest, compute_digest_with_chunk_size, CancelToken, ContentHasher, Digest, DigestError,
        FailureKind, ScanError, Sha256Hasher,
    };
    pub use crate::scanner::{
        find_duplicates, DuplicateGroup, DuplicateScanner, FileEntry, ScanOptions, ScanResult, ScanWarning,
        WarningStage,
    };
    pub use crate::reporting::{write_json_report, write_removal_report, write_scan_report};
}
