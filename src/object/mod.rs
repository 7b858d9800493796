//! content-addressed object store
//!
//! every object lives at `<kind dir>/<2 hex>/<62 hex>` as a zstd frame. the
//! hash is taken over the uncompressed payload (raw bytes for blobs,
//! canonical cbor for trees and commits), so digests do not depend on the
//! compressor.

pub mod blob;
pub mod commit;
pub mod tree;

pub use blob::{blob_exists, blob_path, read_blob, write_blob};
pub use commit::{commit_exists, commit_path, read_commit, write_commit};
pub use tree::{empty_tree_hash, read_tree, tree_exists, tree_path, write_tree};

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_object_hash, Hash};
use crate::repo::Repo;

/// zstd level for stored objects (fast, reasonable ratio)
const ZSTD_LEVEL: i32 = 3;

/// location of an object under one of the kind directories
pub(crate) fn object_path(kind_dir: &Path, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    kind_dir.join(dir).join(file)
}

/// compress and store `payload` under `hash` unless it is already present
///
/// atomic write: temp -> fsync -> rename -> fsync parent
pub(crate) fn store_object(repo: &Repo, kind_dir: &Path, hash: &Hash, payload: &[u8]) -> Result<bool> {
    let path = object_path(kind_dir, hash);

    // dedup: if object already exists, we're done
    if path.exists() {
        return Ok(false);
    }

    let compressed = zstd::encode_all(payload, ZSTD_LEVEL).map_err(|e| Error::Io {
        path: PathBuf::from("<zstd>"),
        source: e,
    })?;

    let parent = path.parent().unwrap_or(kind_dir);
    fs::create_dir_all(parent).with_path(parent)?;

    write_atomic(repo, &path, &compressed)?;
    fsync_dir(parent)?;

    Ok(true)
}

/// load an object's payload, checking that it still hashes to `hash`
pub(crate) fn load_object(kind_dir: &Path, hash: &Hash) -> Result<Vec<u8>> {
    let path = object_path(kind_dir, hash);

    let compressed = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*hash)
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    let payload = zstd::decode_all(&compressed[..]).map_err(|_| Error::CorruptObject(*hash))?;

    if compute_object_hash(&payload) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(payload)
}

/// write `bytes` to a fresh temp file, sync it and rename it over `dest`
///
/// the temp file is removed again if any step fails. callers fsync the
/// parent directory once the rename has landed.
pub(crate) fn write_atomic(repo: &Repo, dest: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = repo.tmp_path().join(uuid::Uuid::new_v4().to_string());

    let written = (|| {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(bytes).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
        fs::rename(&tmp_path, dest).with_path(dest)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

/// fsync a directory
pub(crate) fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}
