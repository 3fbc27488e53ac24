//! Survivor selection for duplicate groups

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::core::error::UnknownStrategy;
use crate::scanner::duplicate_detector::DuplicateGroup;
use crate::scanner::file_scanner::FileEntry;

/// Rule deciding which member of a duplicate group is kept
///
/// Every strategy breaks ties in favour of the earliest-discovered member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RetentionStrategy {
    /// Keep the first file found by the traversal
    #[default]
    KeepFirstSeen,
    /// Keep the file with the oldest modification time; files without one
    /// are only kept when no member has one
    KeepOldest,
    /// Keep the file with the shortest path
    KeepShortestPath,
}

impl RetentionStrategy {
    pub const ALL: [RetentionStrategy; 3] = [
        RetentionStrategy::KeepFirstSeen,
        RetentionStrategy::KeepOldest,
        RetentionStrategy::KeepShortestPath,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RetentionStrategy::KeepFirstSeen => "keep-first-seen",
            RetentionStrategy::KeepOldest => "keep-oldest",
            RetentionStrategy::KeepShortestPath => "keep-shortest-path",
        }
    }
}

impl fmt::Display for RetentionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RetentionStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RetentionStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Pick the member of `group` that survives deduplication
///
/// Pure: only the scan-time snapshot in the group is consulted.
pub fn select_survivor(group: &DuplicateGroup, strategy: RetentionStrategy) -> &FileEntry {
    let members = group.members();
    // min_by_key returns the first of several equal minima, which is the tie-break.
    let chosen = match strategy {
        RetentionStrategy::KeepFirstSeen => None,
        // Unknown mtimes sort after every known one.
        RetentionStrategy::KeepOldest => members
            .iter()
            .min_by_key(|f| (f.modified.is_none(), f.modified)),
        RetentionStrategy::KeepShortestPath => {
            members.iter().min_by_key(|f| f.path.as_os_str().len())
        }
    };
    chosen.unwrap_or_else(|| group.first())
}
