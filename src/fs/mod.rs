//! reading the live filesystem

pub mod read;

pub use read::{
    digest_path, read_for_staging, read_symlink_target, FileMetadata, FileType, WorktreeState,
};
