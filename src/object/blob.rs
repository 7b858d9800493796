use std::path::PathBuf;

use tracing::trace;

use crate::error::Result;
use crate::hash::{compute_blob_hash, Hash};
use crate::object::{load_object, object_path, store_object};
use crate::repo::Repo;

/// write a blob to the object store
///
/// returns the blob hash. writing the same content again is a no-op that
/// returns the same hash.
pub fn write_blob(repo: &Repo, content: &[u8]) -> Result<Hash> {
    let hash = compute_blob_hash(content);
    if store_object(repo, &repo.blobs_path(), &hash, content)? {
        trace!(hash = %hash, size = content.len(), "stored blob");
    }
    Ok(hash)
}

/// read blob content
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    load_object(&repo.blobs_path(), hash)
}

/// get the filesystem path to a blob
pub fn blob_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(&repo.blobs_path(), hash)
}

/// check if a blob exists in the object store
pub fn blob_exists(repo: &Repo, hash: &Hash) -> bool {
    blob_path(repo, hash).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::scratch_repo;
    use crate::Error;
    use std::fs;

    #[test]
    fn test_write_and_read_blob() {
        let (_dir, repo) = scratch_repo();

        let content = b"hello, world!";
        let hash = write_blob(&repo, content).unwrap();

        assert!(blob_exists(&repo, &hash));
        assert_eq!(read_blob(&repo, &hash).unwrap(), content);
    }

    #[test]
    fn test_some_data_digest() {
        let (_dir, repo) = scratch_repo();

        let h1 = write_blob(&repo, b"some data").unwrap();
        let h2 = write_blob(&repo, b"some data").unwrap();

        assert_eq!(h1, h2);
        assert_eq!(
            h1.to_hex(),
            "1307990e6ba5ca145eb35e99182a9bec46531bc54ddf656a602c780fa0240dee"
        );
        assert_eq!(read_blob(&repo, &h1).unwrap(), b"some data");
    }

    #[test]
    fn test_empty_blob() {
        let (_dir, repo) = scratch_repo();

        let hash = write_blob(&repo, b"").unwrap();
        assert!(read_blob(&repo, &hash).unwrap().is_empty());
    }

    #[test]
    fn test_blob_path_structure() {
        let (_dir, repo) = scratch_repo();

        let hash = write_blob(&repo, b"test").unwrap();
        let path = blob_path(&repo, &hash);

        // path should be blobs/XX/YYYY...
        let hex = hash.to_hex();
        assert!(path.ends_with(format!("{}/{}", &hex[..2], &hex[2..])));
    }

    #[test]
    fn test_read_nonexistent_blob() {
        let (_dir, repo) = scratch_repo();

        let result = read_blob(&repo, &Hash::ZERO);
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_corrupt_blob_detected() {
        let (_dir, repo) = scratch_repo();

        let hash = write_blob(&repo, b"original").unwrap();
        let path = blob_path(&repo, &hash);

        // valid zstd frame, wrong content
        fs::write(&path, zstd::encode_all(&b"tampered"[..], 3).unwrap()).unwrap();
        assert!(matches!(read_blob(&repo, &hash), Err(Error::CorruptObject(_))));

        // not a zstd frame at all
        fs::write(&path, b"garbage").unwrap();
        assert!(matches!(read_blob(&repo, &hash), Err(Error::CorruptObject(_))));
    }
}
