use crate::error::Result;
use crate::hash::Hash;
use crate::index::Index;
use crate::ops::diff::{diff_index_tree, diff_worktree_index};
use crate::object::read_commit;
use crate::refs::read_head;
use crate::repo::Repo;
use crate::types::DiffEntry;

/// changes staged for the next commit and changes not yet staged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// head commit, `None` before the first commit
    pub head: Option<Hash>,
    /// index vs head tree
    pub staged: Vec<DiffEntry>,
    /// worktree vs index
    pub unstaged: Vec<DiffEntry>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty()
    }
}

/// compare worktree, index and head, keeping only paths that changed
pub fn status(repo: &Repo, index: &Index) -> Result<Status> {
    let head = read_head(repo)?;
    let tree = match head {
        Some(hash) => Some(read_commit(repo, &hash)?.tree),
        None => None,
    };

    let mut staged = diff_index_tree(repo, index, tree)?;
    staged.retain(|d| d.kind.is_change());

    let mut unstaged = diff_worktree_index(repo, index)?;
    unstaged.retain(|d| d.kind.is_change());

    Ok(Status {
        head,
        staged,
        unstaged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add, commit};
    use crate::repo::scratch_repo;
    use crate::types::ChangeKind;
    use std::fs;

    #[test]
    fn test_status_lifecycle() {
        let (dir, repo) = scratch_repo();
        let rc = dir.path().join("home/alice/.vimrc");
        fs::write(&rc, "set nu\n").unwrap();

        let mut index = Index::new();
        assert!(status(&repo, &index).unwrap().is_clean());

        let staged = add(&repo, &mut index, &[rc.clone()]).unwrap();
        let st = status(&repo, &index).unwrap();
        assert_eq!(st.head, None);
        assert_eq!(st.staged, vec![DiffEntry::new(staged[0].clone(), ChangeKind::Added)]);
        assert!(st.unstaged.is_empty());

        commit(&repo, &mut index, "vimrc", "alice").unwrap();
        assert!(status(&repo, &index).unwrap().is_clean());

        fs::write(&rc, "set nonu\n").unwrap();
        let st = status(&repo, &index).unwrap();
        assert!(st.staged.is_empty());
        assert_eq!(st.unstaged, vec![DiffEntry::new(staged[0].clone(), ChangeKind::Modified)]);

        fs::remove_file(&rc).unwrap();
        let st = status(&repo, &index).unwrap();
        assert_eq!(st.unstaged[0].kind, ChangeKind::Missing);
    }
}
