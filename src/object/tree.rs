use std::path::PathBuf;

use tracing::trace;

use crate::error::{Error, Result};
use crate::hash::{compute_object_hash, Hash};
use crate::object::{load_object, object_path, store_object};
use crate::repo::Repo;
use crate::types::Tree;

/// serialize a tree to its canonical cbor form
fn encode_tree(tree: &Tree) -> Result<Vec<u8>> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(tree, &mut cbor_bytes)?;
    Ok(cbor_bytes)
}

/// write a tree to the object store
///
/// `Tree` keeps its entries sorted and unique, so equal entry sets always
/// serialize to the same bytes and hash.
pub fn write_tree(repo: &Repo, tree: &Tree) -> Result<Hash> {
    let cbor_bytes = encode_tree(tree)?;
    let hash = compute_object_hash(&cbor_bytes);
    if store_object(repo, &repo.trees_path(), &hash, &cbor_bytes)? {
        trace!(hash = %hash, entries = tree.len(), "stored tree");
    }
    Ok(hash)
}

/// read a tree from the object store
pub fn read_tree(repo: &Repo, hash: &Hash) -> Result<Tree> {
    let cbor_bytes = load_object(&repo.trees_path(), hash)?;

    let tree: Tree =
        ciborium::from_reader(&cbor_bytes[..]).map_err(|_| Error::CorruptObject(*hash))?;
    if !tree.is_canonical() {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(tree)
}

/// digest of the tree with no entries
pub fn empty_tree_hash() -> Result<Hash> {
    Ok(compute_object_hash(&encode_tree(&Tree::empty())?))
}

/// get the filesystem path to a tree object
pub fn tree_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(&repo.trees_path(), hash)
}

/// check if a tree exists in the object store
pub fn tree_exists(repo: &Repo, hash: &Hash) -> bool {
    tree_path(repo, hash).exists()
}
