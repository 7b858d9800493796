mod commit;
mod metadata;
mod tree;

pub use commit::Commit;
pub use metadata::{ChangeKind, DiffEntry};
pub use tree::{EntryKind, Tree, TreeEntry, DIR_MODE};
pub(crate) use tree::validate_entry_name;
