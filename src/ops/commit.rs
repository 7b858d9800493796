use tracing::info;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{read_commit, write_commit};
use crate::ops::build_tree;
use crate::refs::{read_head, write_head};
use crate::repo::Repo;
use crate::types::Commit;

/// record the index as a new commit on top of head
///
/// head only moves once the tree and commit objects are stored, so any
/// failure leaves the history as it was. the first commit may record an
/// empty tree; afterwards a tree equal to the parent's is `EmptyCommit`.
/// on success every index entry is marked committed.
pub fn commit(repo: &Repo, index: &mut Index, message: &str, author: &str) -> Result<Hash> {
    let tree = build_tree(repo, index.entries())?;

    let parent = read_head(repo)?;
    if let Some(parent) = parent {
        if read_commit(repo, &parent)?.tree == tree {
            return Err(Error::EmptyCommit);
        }
    }

    let commit = Commit::new(tree, parent, author, message);
    let hash = write_commit(repo, &commit)?;
    write_head(repo, &hash)?;
    index.mark_committed();

    info!(commit = %hash, tree = %tree, parent = ?parent, "committed");
    Ok(hash)
}
