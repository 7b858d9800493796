use std::fs::File;
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::namespace::PathTranslator;

/// a dotkeeper repository rooted at a base directory
///
/// layout:
/// ```text
/// <base>/config.toml
/// <base>/repo/objects/{blobs,trees,commits}
/// <base>/repo/{index,HEAD,tmp,.lock}
/// ```
pub struct Repo {
    base: PathBuf,
    config: Config,
    translator: PathTranslator,
}

impl Repo {
    /// initialize a new repository at the given base directory
    ///
    /// an existing config.toml is kept and takes precedence over `config`.
    pub fn init(base: &Path, config: Config) -> Result<Self> {
        let store = base.join("repo");
        if store.join("objects").exists() {
            return Err(Error::RepoExists(base.to_path_buf()));
        }

        let config_path = base.join("config.toml");
        let config = if config_path.exists() {
            warn!(path = %config_path.display(), "config file already exists, keeping it");
            Config::load(&config_path)?
        } else {
            config
        };
        let translator = config.translator()?;
        // the config file is the first tracked file, so it must map into the repo
        translator.to_repo_path(&config_path)?;

        std::fs::create_dir_all(store.join("objects/blobs")).with_path(&store)?;
        std::fs::create_dir_all(store.join("objects/trees")).with_path(&store)?;
        std::fs::create_dir_all(store.join("objects/commits")).with_path(&store)?;
        std::fs::create_dir_all(store.join("tmp")).with_path(&store)?;

        if !config_path.exists() {
            config.save(&config_path)?;
        }
        debug!(base = %base.display(), "initialized repository layout");

        Ok(Self {
            base: base.to_path_buf(),
            config,
            translator,
        })
    }

    /// open an existing repository, validating its configuration
    pub fn open(base: &Path) -> Result<Self> {
        if !base.join("repo/objects").is_dir() {
            return Err(Error::NoRepo(base.to_path_buf()));
        }

        let config = Config::load(&base.join("config.toml"))?;
        let translator = config.translator()?;

        Ok(Self {
            base: base.to_path_buf(),
            config,
            translator,
        })
    }

    /// base directory
    pub fn path(&self) -> &Path {
        &self.base
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// path to the store directory holding objects, index and head
    pub fn store_path(&self) -> PathBuf {
        self.base.join("repo")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.store_path().join("objects")
    }

    /// path to blobs directory
    pub fn blobs_path(&self) -> PathBuf {
        self.objects_path().join("blobs")
    }

    /// path to trees directory
    pub fn trees_path(&self) -> PathBuf {
        self.objects_path().join("trees")
    }

    /// path to commits directory
    pub fn commits_path(&self) -> PathBuf {
        self.objects_path().join("commits")
    }

    /// path to the index file
    pub fn index_path(&self) -> PathBuf {
        self.store_path().join("index")
    }

    /// path to the head reference
    pub fn head_path(&self) -> PathBuf {
        self.store_path().join("HEAD")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.store_path().join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.store_path().join(".lock")
    }

    /// acquire exclusive lock on repository
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::LockContention)?;

        Ok(RepoLock { flock })
    }

    /// try to acquire exclusive lock, returning None if already locked
    pub fn try_lock(&self) -> Result<Option<RepoLock>> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => Ok(Some(RepoLock { flock })),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Ok(None),
            Err(_) => Err(Error::LockContention),
        }
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    #[allow(dead_code)]
    flock: Flock<File>,
}
// lock is released automatically when Flock is dropped

/// scratch home directory plus an initialized repository inside it
#[cfg(test)]
pub(crate) fn scratch_repo() -> (tempfile::TempDir, Repo) {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("home/alice");
    std::fs::create_dir_all(&home).unwrap();
    let repo = Repo::init(&home.join(".dotkeeper"), Config::new(&home, "alice")).unwrap();
    (dir, repo)
}
