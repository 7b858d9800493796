use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::fs::{read_for_staging, FileMetadata, FileType};
use crate::index::Index;
use crate::namespace::normalize_path;
use crate::object::write_blob;
use crate::repo::Repo;

/// store the content of `paths` and stage them
///
/// directories are walked recursively; regular files and symlinks inside are
/// staged, anything else is skipped. symlinks are never followed. returns the
/// repo paths that were staged, in the order they were visited.
pub fn add<I>(repo: &Repo, index: &mut Index, paths: I) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut staged = Vec::new();

    for path in paths {
        let path = normalize_path(path.as_ref())?;
        let meta = FileMetadata::from_path(&path)?;

        if meta.file_type == FileType::Directory {
            for file in walk_files(&path, &repo.store_path())? {
                staged.push(add_file(repo, index, &file)?);
            }
        } else {
            staged.push(add_file(repo, index, &path)?);
        }
    }

    info!(count = staged.len(), "staged paths");
    Ok(staged)
}

/// regular files and symlinks below `dir`, sorted by file name per directory.
/// the store itself is never descended into.
fn walk_files(dir: &Path, store: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != store);
    for entry in walker {
        let entry = entry.map_err(|e| Error::Io {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
            source: e.into(),
        })?;

        let file_type = entry.file_type();
        if file_type.is_file() || file_type.is_symlink() {
            files.push(entry.into_path());
        } else if !file_type.is_dir() {
            debug!(path = %entry.path().display(), "skipping special file");
        }
    }
    Ok(files)
}

fn add_file(repo: &Repo, index: &mut Index, path: &Path) -> Result<String> {
    let repo_path = repo.translator().to_repo_path(path)?;
    let (content, meta) = read_for_staging(path)?;

    let hash = write_blob(repo, &content)?;
    if index.stage(repo_path.as_str(), hash, meta.stored_mode(), content.len() as u64)? {
        debug!(path = %repo_path, hash = %hash, "staged");
    }
    Ok(repo_path)
}
