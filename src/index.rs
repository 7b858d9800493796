//! the staging area
//!
//! on disk the index is the cbor encoding of [`IndexFile`] followed by a
//! 32 byte sha-256 trailer over that encoding. a missing file is an empty
//! index; anything that fails the trailer check or does not decode is
//! reported as corrupt rather than silently reset.

use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::namespace::validate_repo_path;
use crate::object::{fsync_dir, write_atomic};
use crate::repo::Repo;

const INDEX_VERSION: u32 = 1;
const TRAILER_LEN: usize = 32;

/// whether an entry has been recorded by a commit yet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagedState {
    /// changed by `stage` since the last commit
    Staged,
    /// recorded by the last successful commit
    Committed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub path: String,
    pub hash: Hash,
    pub mode: u32,
    pub size: u64,
    pub state: StagedState,
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    entries: Vec<IndexEntry>,
}

/// map from repo path to staged content
///
/// entries iterate in sorted repo path order rather than insertion order, so
/// iteration is the same before and after a save/load round trip.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<String, IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// stage `path` at `hash`; returns false when the entry already held
    /// the same content and mode
    pub fn stage(&mut self, path: impl Into<String>, hash: Hash, mode: u32, size: u64) -> Result<bool> {
        let path = path.into();
        validate_repo_path(&path)?;

        if let Some(existing) = self.entries.get(&path) {
            if existing.hash == hash && existing.mode == mode {
                return Ok(false);
            }
        }

        trace!(path = %path, hash = %hash, mode, "staged");
        self.entries.insert(
            path.clone(),
            IndexEntry {
                path,
                hash,
                mode,
                size,
                state: StagedState::Staged,
            },
        );
        Ok(true)
    }

    /// drop `path` from the index, returning the removed entry if any
    pub fn unstage(&mut self, path: &str) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// entries in path order; each call starts a fresh walk
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// flag every entry as recorded by the commit that just landed
    pub fn mark_committed(&mut self) {
        for entry in self.entries.values_mut() {
            entry.state = StagedState::Committed;
        }
    }

    /// load the index, or an empty one if none has been written yet
    pub fn load(repo: &Repo) -> Result<Self> {
        let path = repo.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(Error::Io { path, source: e }),
        };

        if bytes.len() < TRAILER_LEN {
            return Err(Error::CorruptData(format!(
                "index {} is truncated",
                path.display()
            )));
        }
        let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
        if Sha256::digest(body).as_slice() != trailer {
            return Err(Error::CorruptData(format!(
                "index {} failed its checksum",
                path.display()
            )));
        }

        let file: IndexFile = ciborium::from_reader(body)
            .map_err(|e| Error::CorruptData(format!("index {}: {}", path.display(), e)))?;
        if file.version != INDEX_VERSION {
            return Err(Error::CorruptData(format!(
                "index {} has unsupported version {}",
                path.display(),
                file.version
            )));
        }

        let mut entries = BTreeMap::new();
        for entry in file.entries {
            if entries.insert(entry.path.clone(), entry).is_some() {
                return Err(Error::CorruptData(format!(
                    "index {} lists a path twice",
                    path.display()
                )));
            }
        }

        debug!(entries = entries.len(), "loaded index");
        Ok(Self { entries })
    }

    /// persist the index
    ///
    /// atomic write: temp -> fsync -> rename -> fsync parent
    pub fn save(&self, repo: &Repo) -> Result<()> {
        let file = IndexFile {
            version: INDEX_VERSION,
            entries: self.entries.values().cloned().collect(),
        };
        let mut bytes = Vec::new();
        ciborium::into_writer(&file, &mut bytes)?;
        let trailer = Sha256::digest(&bytes);
        bytes.extend_from_slice(&trailer);

        let index_path = repo.index_path();
        write_atomic(repo, &index_path, &bytes)?;
        fsync_dir(&repo.store_path())?;

        debug!(entries = self.len(), "saved index");
        Ok(())
    }
}

/// run `f` against the index while holding the repository lock
///
/// the index is saved only when `f` succeeds; the lock is released on every
/// exit path.
pub fn with_index<T, F>(repo: &Repo, f: F) -> Result<T>
where
    F: FnOnce(&mut Index) -> Result<T>,
{
    let _lock = repo.lock()?;
    let mut index = Index::load(repo)?;
    let out = f(&mut index)?;
    index.save(repo)?;
    Ok(out)
}
