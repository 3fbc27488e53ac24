//! Directory traversal and file collection

use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::core::cancel::CancelToken;
use crate::core::error::{DigestError, FailureKind, ScanError};

/// A regular file discovered during a scan
///
/// Snapshot of the file at scan time; not kept in sync with the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
    /// `None` when the platform or filesystem could not report an mtime
    pub modified: Option<SystemTime>,
}

impl FileEntry {
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified: Some(modified),
        }
    }
}

/// Identity of the underlying file, shared by every hard link and every
/// symlink that resolves to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileId {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    Canonical(PathBuf),
}

impl FileId {
    /// Identity from metadata that already followed symlinks.
    #[cfg(unix)]
    pub fn of(_path: &Path, metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(FileId::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Without inode numbers, the canonical path stands in for identity.
    #[cfg(not(unix))]
    pub fn of(path: &Path, _metadata: &Metadata) -> Option<Self> {
        path.canonicalize().ok().map(FileId::Canonical)
    }

    /// Resolve `path` (following symlinks) and return its identity.
    pub fn resolve(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Self::of(path, &metadata)
    }
}

/// True when both paths currently resolve to the same file on disk.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (FileId::resolve(a), FileId::resolve(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Where in the scan a warning was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningStage {
    Traversal,
    Digest,
}

/// Per-file problem that excluded a path from the scan result
#[derive(Debug, Clone, Serialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub stage: WarningStage,
    pub kind: FailureKind,
    pub message: String,
}

impl ScanWarning {
    pub(crate) fn from_walk(root: &Path, err: &walkdir::Error) -> Self {
        let kind = err.io_error().map(FailureKind::from_io).unwrap_or(FailureKind::Io);
        Self {
            path: err.path().unwrap_or(root).to_path_buf(),
            stage: WarningStage::Traversal,
            kind,
            message: err.to_string(),
        }
    }

    pub(crate) fn from_digest(err: &DigestError) -> Self {
        Self {
            path: err.path().to_path_buf(),
            stage: WarningStage::Digest,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Files discovered under a root, in traversal order
#[derive(Debug, Default)]
pub struct FileListing {
    pub files: Vec<FileEntry>,
    pub warnings: Vec<ScanWarning>,
    /// Hard links and followed symlinks to a file already listed
    pub links_skipped: usize,
    pub interrupted: bool,
}

/// Check that `root` is an existing directory and return its canonical form
///
/// # Arguments
/// * `root` - Directory to scan
///
/// # Returns
/// The absolute, canonical root path, or `ScanError::InvalidRoot`
pub fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let invalid = |reason: String| ScanError::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(root).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    root.canonicalize().map_err(|e| invalid(e.to_string()))
}

/// Collect every regular file below a directory
///
/// # Arguments
/// * `root` - Directory to walk (recursively, no depth limit)
/// * `follow_symlinks` - Whether to descend into and report symlink targets
/// * `cancel` - Checked before each entry
///
/// # Returns
/// Files in file-name-sorted traversal order plus any traversal warnings.
/// Unreadable entries become warnings; they never abort the walk. Each
/// underlying file is listed once, under the first path that reached it.
pub fn collect_files(root: &Path, follow_symlinks: bool, cancel: &CancelToken) -> FileListing {
    let mut listing = FileListing::default();
    let mut seen: HashSet<FileId> = HashSet::new();

    let walker = WalkDir::new(root)
        .follow_links(follow_symlinks)
        .sort_by_file_name();

    for entry in walker {
        if cancel.is_cancelled() {
            listing.interrupted = true;
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                listing.warnings.push(ScanWarning::from_walk(root, &e));
                continue;
            }
        };

        // Without follow_links, symlinks report their own type and are skipped here.
        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => {
                if let Some(id) = FileId::of(entry.path(), &metadata) {
                    if !seen.insert(id) {
                        listing.links_skipped += 1;
                        continue;
                    }
                }
                listing.files.push(FileEntry {
                    path: entry.into_path(),
                    size: metadata.len(),
                    modified: metadata.modified().ok(),
                });
            }
            Err(e) => listing.warnings.push(ScanWarning::from_walk(root, &e)),
        }
    }

    listing
}
