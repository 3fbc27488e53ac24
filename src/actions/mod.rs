//! Retention policy and duplicate removal

pub mod retention;
pub mod removal;

pub use retention::{select_survivor, RetentionStrategy};
pub use removal::{
    plan_removal, remove_duplicates, remove_duplicates_with, DeletionFailure, FileRemover, FsRemover,
    GroupOutcome, RemovalPlan, RemovalReport,
};
