use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_commit;
use crate::refs::read_head;
use crate::repo::Repo;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// walk of the commit chain from head back to the first commit
///
/// commits are read one at a time as the iterator advances. the walk stops
/// after the first error.
pub struct Log<'a> {
    repo: &'a Repo,
    next: Option<Hash>,
    seen: HashSet<Hash>,
}

/// history starting at head, newest first; empty before the first commit
pub fn log(repo: &Repo) -> Result<Log<'_>> {
    Ok(Log {
        repo,
        next: read_head(repo)?,
        seen: HashSet::new(),
    })
}

impl Iterator for Log<'_> {
    type Item = Result<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;

        if !self.seen.insert(hash) {
            return Some(Err(Error::CorruptData(format!(
                "commit {} appears twice in history",
                hash
            ))));
        }

        match read_commit(self.repo, &hash) {
            Ok(commit) => {
                self.next = commit.parent;
                Some(Ok(LogEntry { hash, commit }))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "commit {}", self.hash)?;
        writeln!(f, "Author: {}", self.commit.author)?;

        match chrono::DateTime::from_timestamp(self.commit.timestamp, 0) {
            Some(date) => writeln!(f, "Date:   {}", date.format("%Y-%m-%d %H:%M:%S UTC"))?,
            None => writeln!(f, "Date:   @{}", self.commit.timestamp)?,
        }

        writeln!(f)?;
        for line in self.commit.message.lines() {
            writeln!(f, "    {}", line)?;
        }

        Ok(())
    }
}
