use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::{Hash, SYMLINK_MODE};

/// mode recorded for subtree entries
pub const DIR_MODE: u32 = 0o040000;

/// a directory tree - collection of entries sorted by name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a new tree, validating and sorting entries
    pub fn new(mut entries: Vec<TreeEntry>) -> Result<Self> {
        for entry in &entries {
            validate_entry_name(&entry.name)?;
        }

        // sort by name (byte-wise)
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        for window in entries.windows(2) {
            if window[0].name == window[1].name {
                return Err(Error::DuplicateEntryName(window[0].name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// get entries slice
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// consume and return entries
    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }

    /// look up entry by name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// entries must arrive sorted and unique; anything else was not written by us
    pub(crate) fn is_canonical(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].name.as_bytes() < w[1].name.as_bytes())
            && self
                .entries
                .iter()
                .all(|e| validate_entry_name(&e.name).is_ok())
    }
}

/// validate an entry name
pub(crate) fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::InvalidEntryName(format!(
            "name contains '/': {}",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEntryName(format!(
            "name contains null byte: {}",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidEntryName(format!("reserved name: {}", name)));
    }
    Ok(())
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// kind of tree entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// file content (or symlink target when mode is SYMLINK_MODE)
    Blob { hash: Hash, mode: u32 },

    /// subdirectory
    Tree { hash: Hash },
}

impl EntryKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EntryKind::Blob { .. } => "blob",
            EntryKind::Tree { .. } => "tree",
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryKind::Tree { .. })
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, EntryKind::Blob { .. })
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryKind::Blob { mode, .. } if *mode == SYMLINK_MODE)
    }

    pub fn hash(&self) -> &Hash {
        match self {
            EntryKind::Blob { hash, .. } => hash,
            EntryKind::Tree { hash } => hash,
        }
    }

    pub fn mode(&self) -> u32 {
        match self {
            EntryKind::Blob { mode, .. } => *mode,
            EntryKind::Tree { .. } => DIR_MODE,
        }
    }

    pub fn blob(hash: Hash, mode: u32) -> Self {
        Self::Blob { hash, mode }
    }

    pub fn tree(hash: Hash) -> Self {
        Self::Tree { hash }
    }
}
