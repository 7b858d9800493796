//! high-level operations on dotkeeper repositories

mod add;
mod build_tree;
mod commit;
mod diff;
mod init;
mod log;
mod ls_tree;
mod status;
mod text_diff;

pub use add::add;
pub use build_tree::build_tree;
pub use commit::commit;
pub use diff::{diff_index_tree, diff_trees, diff_worktree_index, flatten_tree};
pub use init::{init, INITIAL_COMMIT_MESSAGE};
pub use log::{log, Log, LogEntry};
pub use ls_tree::{find_entry, ls_tree, LsTreeEntry};
pub use status::{status, Status};
pub use text_diff::unified_diff;
