use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::hash::Hash;
use crate::index::with_index;
use crate::ops::{add, commit};
use crate::repo::Repo;

/// message of the commit recorded by [`init`]
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// create a repository at `base` and record its config file as the first
/// commit, so history is never empty after init
pub fn init(base: &Path, config: Config) -> Result<(Repo, Hash)> {
    let repo = Repo::init(base, config)?;
    let config_path = repo.config_path();
    let author = repo.config().author().to_string();

    let hash = with_index(&repo, |index| {
        add(&repo, index, [&config_path])?;
        commit(&repo, index, INITIAL_COMMIT_MESSAGE, &author)
    })?;

    info!(base = %base.display(), commit = %hash, "initialized repository");
    Ok((repo, hash))
}
