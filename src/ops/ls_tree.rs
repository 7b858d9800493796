use crate::error::Result;
use crate::hash::Hash;
use crate::object::read_tree;
use crate::repo::Repo;
use crate::types::{EntryKind, Tree, TreeEntry};

/// list tree entry with full path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsTreeEntry {
    pub path: String,
    pub entry: TreeEntry,
}

impl std::fmt::Display for LsTreeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:06o} {} {}\t{}",
            self.entry.kind.mode(),
            self.entry.type_name(),
            self.entry.kind.hash(),
            self.path
        )
    }
}

/// list every entry below `tree`, subtrees before their contents
pub fn ls_tree(repo: &Repo, tree: &Hash) -> Result<Vec<LsTreeEntry>> {
    let mut out = Vec::new();
    walk(repo, &read_tree(repo, tree)?, "", &mut out)?;
    Ok(out)
}

fn walk(repo: &Repo, tree: &Tree, prefix: &str, out: &mut Vec<LsTreeEntry>) -> Result<()> {
    for entry in tree.entries() {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", prefix, entry.name)
        };

        out.push(LsTreeEntry {
            path: path.clone(),
            entry: entry.clone(),
        });

        if let EntryKind::Tree { hash } = &entry.kind {
            walk(repo, &read_tree(repo, hash)?, &path, out)?;
        }
    }
    Ok(())
}

/// look up a single repo path inside `tree`
///
/// returns `None` when any segment is missing or a leading segment is not a
/// directory.
pub fn find_entry(repo: &Repo, tree: &Hash, repo_path: &str) -> Result<Option<TreeEntry>> {
    let segments: Vec<&str> = repo_path.split('/').filter(|s| !s.is_empty()).collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Ok(None),
    };

    let mut current = read_tree(repo, tree)?;
    for segment in parents {
        let next = match current.get(segment) {
            Some(TreeEntry {
                kind: EntryKind::Tree { hash },
                ..
            }) => *hash,
            _ => return Ok(None),
        };
        current = read_tree(repo, &next)?;
    }

    Ok(current.get(last).cloned())
}
