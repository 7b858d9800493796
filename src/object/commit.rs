use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::{compute_object_hash, Hash};
use crate::object::{load_object, object_path, store_object};
use crate::repo::Repo;
use crate::types::Commit;

/// write a commit to the object store
///
/// the commit id is the hash of its canonical cbor encoding.
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(commit, &mut cbor_bytes)?;

    let hash = compute_object_hash(&cbor_bytes);
    store_object(repo, &repo.commits_path(), &hash, &cbor_bytes)?;
    Ok(hash)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let cbor_bytes = load_object(&repo.commits_path(), hash)?;
    ciborium::from_reader(&cbor_bytes[..]).map_err(|_| Error::CorruptObject(*hash))
}

/// get the filesystem path to a commit object
pub fn commit_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(&repo.commits_path(), hash)
}

/// check if a commit exists in the object store
pub fn commit_exists(repo: &Repo, hash: &Hash) -> bool {
    commit_path(repo, hash).exists()
}
