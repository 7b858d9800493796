//! the single head reference
//!
//! HEAD is absent until the first commit. afterwards it holds the hex id of
//! the newest commit followed by a newline and only ever moves forward.

use std::fs;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{fsync_dir, write_atomic};
use crate::repo::Repo;

/// read the current head, `None` before the first commit
pub fn read_head(repo: &Repo) -> Result<Option<Hash>> {
    let head_path = repo.head_path();

    let content = match fs::read_to_string(&head_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Io {
                path: head_path,
                source: e,
            })
        }
    };

    Hash::from_hex(content.trim())
        .map(Some)
        .map_err(|_| Error::CorruptData(format!("unparsable head reference in {}", head_path.display())))
}

/// point head at `hash`
///
/// atomic write: temp -> fsync -> rename; readers see either the old or the
/// new commit id, never a partial one.
pub fn write_head(repo: &Repo, hash: &Hash) -> Result<()> {
    let head_path = repo.head_path();

    write_atomic(repo, &head_path, format!("{}\n", hash.to_hex()).as_bytes())?;
    fsync_dir(&repo.store_path())?;

    Ok(())
}

/// resolve a commit argument: full hex id, or "HEAD"
pub fn resolve(repo: &Repo, rev: &str) -> Result<Hash> {
    if rev == "HEAD" {
        return read_head(repo)?.ok_or(Error::NoCommits);
    }
    Hash::from_hex(rev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::scratch_repo;

    #[test]
    fn test_head_absent_before_first_commit() {
        let (_dir, repo) = scratch_repo();
        assert_eq!(read_head(&repo).unwrap(), None);
    }

    #[test]
    fn test_write_and_read_head() {
        let (_dir, repo) = scratch_repo();

        let hash =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();

        write_head(&repo, &hash).unwrap();
        assert_eq!(read_head(&repo).unwrap(), Some(hash));
        assert_eq!(resolve(&repo, "HEAD").unwrap(), hash);
    }

    #[test]
    fn test_overwrite_head() {
        let (_dir, repo) = scratch_repo();

        let hash1 =
            Hash::from_hex("1111111111111111111111111111111111111111111111111111111111111111")
                .unwrap();
        let hash2 =
            Hash::from_hex("2222222222222222222222222222222222222222222222222222222222222222")
                .unwrap();

        write_head(&repo, &hash1).unwrap();
        write_head(&repo, &hash2).unwrap();

        assert_eq!(read_head(&repo).unwrap(), Some(hash2));
    }

    #[test]
    fn test_failed_head_write_leaves_no_temp_file() {
        let (_dir, repo) = scratch_repo();

        // a non-empty directory where HEAD belongs makes the rename fail
        fs::create_dir_all(repo.head_path().join("blocker")).unwrap();
        assert!(matches!(
            write_head(&repo, &Hash::ZERO),
            Err(Error::Io { .. })
        ));
        assert_eq!(fs::read_dir(repo.tmp_path()).unwrap().count(), 0);
    }

    #[test]
    fn test_corrupt_head() {
        let (_dir, repo) = scratch_repo();

        fs::write(repo.head_path(), "not a commit id\n").unwrap();
        assert!(matches!(read_head(&repo), Err(Error::CorruptData(_))));
    }

    #[test]
    fn test_resolve_hex() {
        let (_dir, repo) = scratch_repo();

        let hex = "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789";
        assert_eq!(resolve(&repo, hex).unwrap().to_hex(), hex);
        assert!(matches!(resolve(&repo, "HEAD"), Err(Error::NoCommits)));
        assert!(resolve(&repo, "main").is_err());
    }
}
