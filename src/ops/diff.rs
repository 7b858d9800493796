use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::fs::{digest_path, WorktreeState};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::read_tree;
use crate::repo::Repo;
use crate::types::{ChangeKind, DiffEntry, EntryKind};

/// content digest and mode of one file
type Snapshot = BTreeMap<String, (Hash, u32)>;

/// flatten a stored tree into `repo path -> (hash, mode)`
pub fn flatten_tree(repo: &Repo, tree: &Hash) -> Result<BTreeMap<String, (Hash, u32)>> {
    let mut out = BTreeMap::new();
    flatten_into(repo, tree, "", &mut out)?;
    Ok(out)
}

fn flatten_into(repo: &Repo, tree: &Hash, prefix: &str, out: &mut Snapshot) -> Result<()> {
    for entry in read_tree(repo, tree)?.into_entries() {
        let path = if prefix.is_empty() {
            entry.name
        } else {
            format!("{}/{}", prefix, entry.name)
        };
        match entry.kind {
            EntryKind::Blob { hash, mode } => {
                out.insert(path, (hash, mode));
            }
            EntryKind::Tree { hash } => flatten_into(repo, &hash, &path, out)?,
        }
    }
    Ok(())
}

fn flatten_optional(repo: &Repo, tree: Option<Hash>) -> Result<Snapshot> {
    match tree {
        Some(hash) => flatten_tree(repo, &hash),
        None => Ok(Snapshot::new()),
    }
}

fn classify(old: Option<&(Hash, u32)>, new: Option<&(Hash, u32)>) -> ChangeKind {
    match (old, new) {
        (None, Some(_)) => ChangeKind::Added,
        (Some(_), None) => ChangeKind::Removed,
        (Some((old_hash, _)), Some((new_hash, _))) if old_hash != new_hash => ChangeKind::Modified,
        (Some((_, old_mode)), Some((_, new_mode))) if old_mode != new_mode => {
            ChangeKind::ModeChanged
        }
        _ => ChangeKind::Unchanged,
    }
}

/// merge two snapshots over the union of their paths, in path order
fn diff_snapshots(old: &Snapshot, new: &Snapshot) -> Vec<DiffEntry> {
    let mut paths: Vec<&String> = old.keys().chain(new.keys()).collect();
    paths.sort();
    paths.dedup();

    paths
        .into_iter()
        .map(|path| DiffEntry::new(path.clone(), classify(old.get(path), new.get(path))))
        .collect()
}

/// compare the index against a committed tree (`None` = empty tree)
///
/// the tree is the old side: paths only in the index are `Added`, paths only
/// in the tree are `Removed`.
pub fn diff_index_tree(repo: &Repo, index: &Index, tree: Option<Hash>) -> Result<Vec<DiffEntry>> {
    let committed = flatten_optional(repo, tree)?;
    let staged: Snapshot = index
        .entries()
        .map(|e| (e.path.clone(), (e.hash, e.mode)))
        .collect();

    let diff = diff_snapshots(&committed, &staged);
    debug!(
        paths = diff.len(),
        changed = diff.iter().filter(|d| d.kind.is_change()).count(),
        "diffed index against tree"
    );
    Ok(diff)
}

/// compare the live filesystem against the index
///
/// live files are digested in a streaming fashion and never written to the
/// store. a path whose file is gone is `Missing`.
pub fn diff_worktree_index(repo: &Repo, index: &Index) -> Result<Vec<DiffEntry>> {
    let translator = repo.translator();
    let mut diff = Vec::with_capacity(index.len());

    for entry in index.entries() {
        let abs = translator.to_absolute_path(&entry.path)?;
        let kind = match digest_path(&abs)? {
            WorktreeState::Missing => ChangeKind::Missing,
            WorktreeState::Present { hash, mode } => {
                classify(Some(&(entry.hash, entry.mode)), Some(&(hash, mode)))
            }
        };
        diff.push(DiffEntry::new(entry.path.clone(), kind));
    }

    debug!(paths = diff.len(), "diffed worktree against index");
    Ok(diff)
}

/// compare two committed trees (`None` = empty tree)
pub fn diff_trees(repo: &Repo, old: Option<Hash>, new: Option<Hash>) -> Result<Vec<DiffEntry>> {
    let old = flatten_optional(repo, old)?;
    let new = flatten_optional(repo, new)?;
    Ok(diff_snapshots(&old, &new))
}
