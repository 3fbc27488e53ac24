//! File scanning and duplicate grouping

pub mod file_scanner;
pub mod duplicate_detector;

pub use file_scanner::{collect_files, resolve_root, FileEntry, FileListing, ScanWarning, WarningStage};
pub use duplicate_detector::{find_duplicates, DuplicateGroup, DuplicateScanner, ScanOptions, ScanResult};
