use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::IndexEntry;
use crate::object::write_tree;
use crate::repo::Repo;
use crate::types::{validate_entry_name, EntryKind, Tree, TreeEntry};

/// in-memory directory hierarchy assembled before anything is written
enum Node {
    File { hash: Hash, mode: u32 },
    Dir(BTreeMap<String, Node>),
}

/// build the tree hierarchy for a set of index entries and store it
///
/// the whole hierarchy is assembled and checked first, so a conflicting or
/// malformed path leaves the store untouched. subtrees are then written
/// bottom-up and the root tree hash is returned. input order does not
/// matter; no entries yields the empty tree.
pub fn build_tree<'a, I>(repo: &Repo, entries: I) -> Result<Hash>
where
    I: IntoIterator<Item = &'a IndexEntry>,
{
    let mut root = BTreeMap::new();
    let mut count = 0usize;
    for entry in entries {
        insert(&mut root, &entry.path, entry.hash, entry.mode)?;
        count += 1;
    }

    let hash = write_dir(repo, root)?;
    debug!(hash = %hash, entries = count, "built tree");
    Ok(hash)
}

fn insert(root: &mut BTreeMap<String, Node>, path: &str, hash: Hash, mode: u32) -> Result<()> {
    let segments: Vec<&str> = path.split('/').collect();
    for segment in &segments {
        validate_entry_name(segment)
            .map_err(|_| Error::InvalidEntryName(format!("{:?} in {}", segment, path)))?;
    }

    let (name, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Err(Error::InvalidEntryName(path.to_string())),
    };

    let mut dir = root;
    for (depth, segment) in parents.iter().enumerate() {
        let node = dir
            .entry((*segment).to_string())
            .or_insert_with(|| Node::Dir(BTreeMap::new()));
        dir = match node {
            Node::Dir(children) => children,
            Node::File { .. } => return Err(Error::PathConflict(segments[..=depth].join("/"))),
        };
    }

    match dir.get(*name) {
        Some(Node::Dir(_)) => Err(Error::PathConflict(path.to_string())),
        Some(Node::File { .. }) => Err(Error::DuplicateEntryName(path.to_string())),
        None => {
            dir.insert((*name).to_string(), Node::File { hash, mode });
            Ok(())
        }
    }
}

fn write_dir(repo: &Repo, children: BTreeMap<String, Node>) -> Result<Hash> {
    let mut entries = Vec::with_capacity(children.len());
    for (name, node) in children {
        let kind = match node {
            Node::File { hash, mode } => EntryKind::blob(hash, mode),
            Node::Dir(grandchildren) => EntryKind::tree(write_dir(repo, grandchildren)?),
        };
        entries.push(TreeEntry::new(name, kind));
    }
    write_tree(repo, &Tree::new(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::compute_blob_hash;
    use crate::index::StagedState;
    use crate::object::{empty_tree_hash, read_tree};
    use crate::repo::scratch_repo;
    use proptest::prelude::*;
    use std::fs;

    fn entry(path: &str, content: &[u8]) -> IndexEntry {
        IndexEntry {
            path: path.to_string(),
            hash: compute_blob_hash(content),
            mode: 0o100644,
            size: content.len() as u64,
            state: StagedState::Staged,
        }
    }

    fn stored_trees(repo: &Repo) -> usize {
        fs::read_dir(repo.trees_path()).unwrap().count()
    }

    #[test]
    fn test_empty_index_builds_empty_tree() {
        let (_dir, repo) = scratch_repo();

        let hash = build_tree(&repo, std::iter::empty()).unwrap();
        assert_eq!(hash, empty_tree_hash().unwrap());
        assert!(read_tree(&repo, &hash).unwrap().is_empty());
    }

    #[test]
    fn test_nested_layout() {
        let (_dir, repo) = scratch_repo();

        let entries = vec![
            entry("home/.bashrc", b"bash"),
            entry("home/.config/nvim/init.lua", b"lua"),
            entry("etc/hosts", b"hosts"),
        ];
        let root = read_tree(&repo, &build_tree(&repo, &entries).unwrap()).unwrap();

        let names: Vec<_> = root.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["etc", "home"]);

        let home = read_tree(&repo, root.get("home").unwrap().kind.hash()).unwrap();
        assert_eq!(
            home.get(".bashrc").unwrap().kind,
            EntryKind::blob(compute_blob_hash(b"bash"), 0o100644)
        );
        assert!(home.get(".config").unwrap().kind.is_tree());
    }

    #[test]
    fn test_file_directory_conflict_writes_nothing() {
        let (_dir, repo) = scratch_repo();

        for entries in [
            vec![entry("home/a", b"1"), entry("home/a/b", b"2")],
            vec![entry("home/a/b", b"2"), entry("home/a", b"1")],
        ] {
            assert!(matches!(
                build_tree(&repo, &entries),
                Err(Error::PathConflict(p)) if p == "home/a"
            ));
        }
        assert_eq!(stored_trees(&repo), 0);
    }

    #[test]
    fn test_invalid_segment_writes_nothing() {
        let (_dir, repo) = scratch_repo();

        for bad in ["home//x", "home/../x", "./x", ""] {
            let entries = vec![entry("home/ok", b"1"), entry(bad, b"2")];
            assert!(
                matches!(build_tree(&repo, &entries), Err(Error::InvalidEntryName(_))),
                "{:?} should be rejected",
                bad
            );
        }
        assert_eq!(stored_trees(&repo), 0);
    }

    #[test]
    fn test_tree_tracks_mode() {
        let (_dir, repo) = scratch_repo();

        let plain = vec![entry("home/run.sh", b"#!/bin/sh")];
        let mut exec = plain.clone();
        exec[0].mode = 0o100755;

        assert_ne!(
            build_tree(&repo, &plain).unwrap(),
            build_tree(&repo, &exec).unwrap()
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_permutation_invariant(
            (paths, shuffled) in prop::collection::btree_set("[a-c]{1,2}(/[a-c]{1,2}){0,2}", 1..8)
                .prop_flat_map(|set| {
                    let paths: Vec<String> = set.into_iter().collect();
                    (Just(paths.clone()), Just(paths).prop_shuffle())
                })
        ) {
            let (_dir, repo) = scratch_repo();

            let forward: Vec<_> = paths.iter().map(|p| entry(p, p.as_bytes())).collect();
            let permuted: Vec<_> = shuffled.iter().map(|p| entry(p, p.as_bytes())).collect();

            match (build_tree(&repo, &forward), build_tree(&repo, &permuted)) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(Error::PathConflict(_)), Err(Error::PathConflict(_))) => {}
                (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
            }
        }
    }
}
