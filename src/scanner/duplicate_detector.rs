//! Duplicate file detection by content digest

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::core::cancel::CancelToken;
use crate::core::digest::{ContentHasher, Digest, Sha256Hasher};
use crate::core::error::{DigestError, ScanError};
use crate::scanner::file_scanner::{collect_files, resolve_root, FileEntry, ScanWarning};

/// Files sharing one digest. Always holds at least two members, in
/// discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    digest: Digest,
    members: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Returns `None` when fewer than two members are given.
    pub fn new(digest: Digest, members: Vec<FileEntry>) -> Option<Self> {
        (members.len() >= 2).then_some(Self { digest, members })
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn members(&self) -> &[FileEntry] {
        &self.members
    }

    /// Earliest-discovered member.
    pub fn first(&self) -> &FileEntry {
        &self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Bytes taken by every copy beyond one.
    pub fn wasted_bytes(&self) -> u64 {
        self.first().size * (self.members.len() as u64 - 1)
    }
}

/// Outcome of one scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Groups ordered by their first-seen member
    pub groups: Vec<DuplicateGroup>,
    /// Files that were skipped, with the reason
    pub warnings: Vec<ScanWarning>,
    /// Regular files discovered under the root
    pub files_scanned: usize,
    /// Files whose digest was computed
    pub files_hashed: usize,
    /// Hard links and followed symlinks skipped because their target was
    /// already listed
    pub links_skipped: usize,
    /// Set when the scan was cancelled before every file was visited
    pub interrupted: bool,
}

impl ScanResult {
    pub fn get(&self, digest: &Digest) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.digest() == digest)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of redundant files (all members beyond one per group)
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.len() - 1).sum()
    }

    pub fn wasted_bytes(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_bytes).sum()
    }
}

/// Scan configuration
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Follow symbolic links while walking. Off by default so link cycles
    /// cannot trap the walk.
    pub follow_symlinks: bool,
    /// Only hash files whose size matches another file's. Produces the same
    /// groups, but unreadable files of unique size go unreported.
    pub size_prefilter: bool,
    pub cancel: CancelToken,
}

/// Walks a directory and groups its files by content digest
#[derive(Debug, Clone)]
pub struct DuplicateScanner<H = Sha256Hasher> {
    hasher: H,
    options: ScanOptions,
}

impl DuplicateScanner<Sha256Hasher> {
    pub fn new(options: ScanOptions) -> Self {
        Self::with_hasher(Sha256Hasher::default(), options)
    }
}

impl<H: ContentHasher> DuplicateScanner<H> {
    pub fn with_hasher(hasher: H, options: ScanOptions) -> Self {
        Self { hasher, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Find duplicate files under `root`
    ///
    /// # Arguments
    /// * `root` - Existing directory to scan recursively
    ///
    /// # Returns
    /// Groups of two or more files with identical content. Files that cannot
    /// be read are listed in `warnings` and left out of every group. Only an
    /// invalid root is an error.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        let root = resolve_root(root)?;
        let cancel = &self.options.cancel;

        let listing = collect_files(&root, self.options.follow_symlinks, cancel);
        let files_scanned = listing.files.len();
        let links_skipped = listing.links_skipped;
        let mut warnings = listing.warnings;

        let candidates = if self.options.size_prefilter {
            shared_size_candidates(listing.files)
        } else {
            listing.files
        };

        // Order-preserving parallel map; None marks files skipped after cancellation.
        let digests: Vec<Option<Result<Digest, DigestError>>> = candidates
            .par_iter()
            .map(|entry| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(self.hasher.digest(&entry.path))
            })
            .collect();

        let mut interrupted = listing.interrupted;
        let mut files_hashed = 0;
        let mut order: Vec<Digest> = Vec::new();
        let mut buckets: HashMap<Digest, Vec<FileEntry>> = HashMap::new();

        for (entry, outcome) in candidates.into_iter().zip(digests) {
            match outcome {
                None => interrupted = true,
                Some(Err(e)) => warnings.push(ScanWarning::from_digest(&e)),
                Some(Ok(digest)) => {
                    files_hashed += 1;
                    let bucket = buckets.entry(digest).or_insert_with(|| {
                        order.push(digest);
                        Vec::new()
                    });
                    bucket.push(entry);
                }
            }
        }

        let groups = order
            .into_iter()
            .filter_map(|digest| {
                let members = buckets.remove(&digest)?;
                DuplicateGroup::new(digest, members)
            })
            .collect();

        Ok(ScanResult {
            groups,
            warnings,
            files_scanned,
            files_hashed,
            links_skipped,
            interrupted,
        })
    }
}

/// Find duplicate files under `root` with default options
///
/// # Arguments
/// * `root` - Existing directory to scan recursively
///
/// # Returns
/// A `ScanResult` whose groups all have two or more members
pub fn find_duplicates(root: &Path) -> Result<ScanResult, ScanError> {
    DuplicateScanner::new(ScanOptions::default()).scan(root)
}

/// Keep only files whose size occurs more than once, preserving order.
fn shared_size_candidates(files: Vec<FileEntry>) -> Vec<FileEntry> {
    let mut size_counts: HashMap<u64, usize> = HashMap::new();
    for file in &files {
        *size_counts.entry(file.size).or_insert(0) += 1;
    }
    files
        .into_iter()
        .filter(|f| size_counts.get(&f.size).copied().unwrap_or(0) > 1)
        .collect()
}
