//! Error types shared by the digest engine, the scanner and the removal step

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Classified reason for a per-file failure.
///
/// Attached to scan warnings and failed deletions so callers can aggregate
/// failures without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    PermissionDenied,
    Io,
    /// The file chosen to survive vanished before its copies were removed.
    SurvivorMissing,
    /// The path is a link to the survivor itself, not a separate copy.
    SameFileAsSurvivor,
}

impl FailureKind {
    /// Map an I/O error onto the coarse failure classes.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FailureKind::NotFound,
            io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            _ => FailureKind::Io,
        }
    }
}

/// Failure to compute the digest of a single file.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DigestError {
    /// Build a digest error for a failed `open`, keeping the not-found and
    /// permission cases distinct.
    pub fn on_open(path: &Path, err: io::Error) -> Self {
        match FailureKind::from_io(&err) {
            FailureKind::NotFound => DigestError::NotFound(path.to_path_buf()),
            FailureKind::PermissionDenied => DigestError::PermissionDenied(path.to_path_buf()),
            _ => DigestError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Build a digest error for a failure after the file was opened.
    pub fn on_read(path: &Path, err: io::Error) -> Self {
        DigestError::Io {
            path: path.to_path_buf(),
            source: err,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            DigestError::NotFound(p) | DigestError::PermissionDenied(p) => p,
            DigestError::Io { path, .. } => path,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DigestError::NotFound(_) => FailureKind::NotFound,
            DigestError::PermissionDenied(_) => FailureKind::PermissionDenied,
            DigestError::Io { .. } => FailureKind::Io,
        }
    }
}

/// Structural failure that aborts a whole scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root is missing, unreadable or not a directory.
    #[error("invalid scan root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
}

/// Failure to delete one duplicate. Collected into removal reports, never
/// propagated.
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("survivor {survivor} is missing, refusing to delete {path}")]
    SurvivorMissing { path: PathBuf, survivor: PathBuf },

    #[error("{path} resolves to the survivor {survivor}, refusing to delete it")]
    SameFileAsSurvivor { path: PathBuf, survivor: PathBuf },

    #[error("failed to delete {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeletionError {
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match FailureKind::from_io(&err) {
            FailureKind::NotFound => DeletionError::NotFound(path.to_path_buf()),
            FailureKind::PermissionDenied => DeletionError::PermissionDenied(path.to_path_buf()),
            _ => DeletionError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DeletionError::NotFound(_) => FailureKind::NotFound,
            DeletionError::PermissionDenied(_) => FailureKind::PermissionDenied,
            DeletionError::SurvivorMissing { .. } => FailureKind::SurvivorMissing,
            DeletionError::SameFileAsSurvivor { .. } => FailureKind::SameFileAsSurvivor,
            DeletionError::Io { .. } => FailureKind::Io,
        }
    }
}

/// Unknown retention strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown retention strategy '{0}' (expected keep-first-seen, keep-oldest or keep-shortest-path)")]
pub struct UnknownStrategy(pub String);
