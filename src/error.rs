use std::path::PathBuf;

use crate::Hash;

/// error type for dotkeeper operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository not found at {0}")]
    NoRepo(PathBuf),

    #[error("repository already exists at {0}")]
    RepoExists(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("path conflict: {0} is staged both as a file and as a directory")]
    PathConflict(String),

    #[error("path {path} cannot be tracked: {reason}")]
    OutsideScope { path: PathBuf, reason: &'static str },

    #[error("home directory {home} does not end with user name {user:?}")]
    ConfigInvariant { home: PathBuf, user: String },

    #[error("no commits yet")]
    NoCommits,

    #[error("nothing to commit: tree is unchanged since the last commit")]
    EmptyCommit,

    #[error("lock contention on repository")]
    LockContention,

    #[error("cannot determine the current user")]
    NoUser,

    #[error("invalid tree entry name: {0}")]
    InvalidEntryName(String),

    #[error("duplicate tree entry name: {0}")]
    DuplicateEntryName(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("invalid object type: {0}")]
    InvalidObjectType(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
