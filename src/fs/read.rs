use std::fs::{self, File, Metadata};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_blob_hash, BlobHasher, Hash, SYMLINK_MODE};

/// file type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    /// devices, fifos, sockets: never tracked
    Other,
}

impl FileType {
    /// detect file type from metadata
    pub fn from_metadata(meta: &Metadata) -> Self {
        let ft = meta.file_type();
        if ft.is_file() {
            FileType::Regular
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_symlink() {
            FileType::Symlink
        } else {
            FileType::Other
        }
    }
}

/// metadata for a filesystem entry
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub file_type: FileType,
    /// full st_mode, including the file type bits
    pub mode: u32,
    pub size: u64,
}

impl FileMetadata {
    /// read metadata from path (does not follow symlinks)
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = fs::symlink_metadata(path).with_path(path)?;
        Ok(Self::from_std_metadata(&meta))
    }

    pub fn from_std_metadata(meta: &Metadata) -> Self {
        Self {
            file_type: FileType::from_metadata(meta),
            mode: meta.mode(),
            size: meta.len(),
        }
    }

    /// mode recorded in the index and in trees
    pub fn stored_mode(&self) -> u32 {
        match self.file_type {
            FileType::Symlink => SYMLINK_MODE,
            _ => self.mode,
        }
    }
}

/// read symlink target as raw bytes
pub fn read_symlink_target(path: &Path) -> Result<Vec<u8>> {
    let target = fs::read_link(path).with_path(path)?;
    Ok(target.as_os_str().as_bytes().to_vec())
}

/// read the bytes that represent `path` in the store: file content, or the
/// target of a symlink
pub fn read_for_staging(path: &Path) -> Result<(Vec<u8>, FileMetadata)> {
    let meta = FileMetadata::from_path(path)?;
    let content = match meta.file_type {
        FileType::Regular => fs::read(path).with_path(path)?,
        FileType::Symlink => read_symlink_target(path)?,
        FileType::Directory | FileType::Other => {
            return Err(Error::OutsideScope {
                path: path.to_path_buf(),
                reason: "only regular files and symlinks can be staged",
            })
        }
    };
    Ok((content, meta))
}

/// what the filesystem currently holds at a tracked path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorktreeState {
    /// nothing trackable at the path any more
    Missing,
    Present { hash: Hash, mode: u32 },
}

/// digest the live file at `path` without writing anything to the store
pub fn digest_path(path: &Path) -> Result<WorktreeState> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => FileMetadata::from_std_metadata(&meta),
        // ENOTDIR: a parent directory was replaced by a file
        Err(e)
            if e.kind() == std::io::ErrorKind::NotFound
                || e.raw_os_error() == Some(nix::errno::Errno::ENOTDIR as i32) =>
        {
            return Ok(WorktreeState::Missing)
        }
        Err(e) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let hash = match meta.file_type {
        FileType::Regular => {
            let mut file = File::open(path).with_path(path)?;
            let mut hasher = BlobHasher::new();
            hasher.update_from(&mut file).with_path(path)?;
            hasher.finalize()
        }
        FileType::Symlink => compute_blob_hash(&read_symlink_target(path)?),
        // a directory or special file now sits where a tracked file was
        FileType::Directory | FileType::Other => return Ok(WorktreeState::Missing),
    };

    Ok(WorktreeState::Present {
        hash,
        mode: meta.stored_mode(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::{symlink, PermissionsExt};
    use tempfile::tempdir;

    #[test]
    fn test_file_types() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        let subdir = dir.path().join("subdir");
        let link = dir.path().join("link");
        fs::write(&file, "content").unwrap();
        fs::create_dir(&subdir).unwrap();
        symlink(&file, &link).unwrap();

        assert_eq!(FileMetadata::from_path(&file).unwrap().file_type, FileType::Regular);
        assert_eq!(FileMetadata::from_path(&subdir).unwrap().file_type, FileType::Directory);
        assert_eq!(FileMetadata::from_path(&link).unwrap().file_type, FileType::Symlink);
    }

    #[test]
    fn test_metadata_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, "content").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let meta = FileMetadata::from_path(&path).unwrap();
        assert_eq!(meta.stored_mode(), 0o100644);
        assert_eq!(meta.size, 7);
    }

    #[test]
    fn test_read_for_staging() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("rc");
        let link = dir.path().join("link");
        fs::write(&file, "some data").unwrap();
        symlink("/some/target/path", &link).unwrap();

        let (content, _) = read_for_staging(&file).unwrap();
        assert_eq!(content, b"some data");

        let (content, meta) = read_for_staging(&link).unwrap();
        assert_eq!(content, b"/some/target/path");
        assert_eq!(meta.stored_mode(), SYMLINK_MODE);

        assert!(matches!(
            read_for_staging(dir.path()),
            Err(Error::OutsideScope { .. })
        ));
    }

    #[test]
    fn test_digest_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("rc");
        fs::write(&file, "some data").unwrap();

        match digest_path(&file).unwrap() {
            WorktreeState::Present { hash, .. } => {
                assert_eq!(hash, compute_blob_hash(b"some data"))
            }
            WorktreeState::Missing => panic!("expected file"),
        }

        assert_eq!(
            digest_path(&dir.path().join("gone")).unwrap(),
            WorktreeState::Missing
        );
        assert_eq!(
            digest_path(&file.join("under_a_file")).unwrap(),
            WorktreeState::Missing
        );
        assert_eq!(digest_path(dir.path()).unwrap(), WorktreeState::Missing);
    }
}
