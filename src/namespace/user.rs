use std::path::PathBuf;

use nix::unistd::{getuid, User};

use crate::error::{Error, Result};

/// home directory and login name of the user running this process
pub fn current_identity() -> Result<(PathBuf, String)> {
    let user = User::from_uid(getuid())
        .map_err(|_| Error::NoUser)?
        .ok_or(Error::NoUser)?;
    Ok((user.dir, user.name))
}
