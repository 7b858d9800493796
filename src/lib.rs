//! dotkeeper - dotfile tracking on a content-addressed store
//!
//! records the content and layout of configuration files from a home
//! directory (and elsewhere on the system) as a linear chain of commits.
//!
//! # Core concepts
//!
//! - **Blob**: content-addressed file data (compressed with zstd)
//! - **Tree**: a serialized directory structure (CBOR + zstd)
//! - **Commit**: a snapshot of a tree with author, time and message
//! - **Index**: the staging area, mapping repo paths to blob hashes
//! - **Head**: the newest commit; history is a single chain
//!
//! # Hash format
//!
//! blob hash = SHA256(content)
//!
//! tree and commit hashes are SHA256 over their canonical CBOR encoding, so a
//! tree hash changes exactly when an entry's name, hash or mode changes.
//!
//! # Repo paths
//!
//! files under the home directory are stored below the home directory's
//! parent with its leading `/` removed: with home `/home/achin`, the file
//! `/home/achin/.vimrc` becomes `home/.vimrc` and `/etc/hosts` becomes
//! `etc/hosts`.
//!
//! # Example usage
//!
//! ```no_run
//! use dotkeeper::{ops, with_index, Config, Repo};
//! use std::path::Path;
//!
//! // create a repository; the config file becomes the first commit
//! let config = Config::new("/home/achin", "achin");
//! let (repo, _) = ops::init(Path::new("/home/achin/.dotkeeper"), config).unwrap();
//!
//! // stage a file and commit it
//! with_index(&repo, |index| {
//!     ops::add(&repo, index, [Path::new("/home/achin/.vimrc")])?;
//!     ops::commit(&repo, index, "track vimrc", "achin")
//! })
//! .unwrap();
//! ```

mod config;
mod error;
mod hash;
mod index;
mod namespace;
mod object;
mod refs;
mod repo;

pub mod fs;
pub mod ops;
pub mod types;

pub use config::{Config, Identity};
pub use error::{Error, Result};
pub use hash::{compute_blob_hash, BlobHasher, Hash, SYMLINK_MODE};
pub use index::{with_index, Index, IndexEntry, StagedState};
pub use namespace::{current_identity, normalize_path, PathTranslator};
pub use object::{
    blob_exists, blob_path, commit_exists, commit_path, empty_tree_hash, read_blob, read_commit,
    read_tree, tree_exists, tree_path, write_blob, write_commit, write_tree,
};
pub use refs::{read_head, resolve, write_head};
pub use repo::{Repo, RepoLock};
pub use types::{ChangeKind, Commit, DiffEntry, EntryKind, Tree, TreeEntry, DIR_MODE};
