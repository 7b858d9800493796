use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// a commit object pointing to a tree snapshot and at most one parent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// root tree hash
    pub tree: Hash,
    /// previous commit; none for the first commit in the chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Hash>,
    /// author identity
    pub author: String,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
    /// commit message
    pub message: String,
}

impl Commit {
    /// create a new commit stamped with the current time
    pub fn new(
        tree: Hash,
        parent: Option<Hash>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_timestamp(tree, parent, author, chrono::Utc::now().timestamp(), message)
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        tree: Hash,
        parent: Option<Hash>,
        author: impl Into<String>,
        timestamp: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent,
            author: author.into(),
            timestamp,
            message: message.into(),
        }
    }

    /// is this the first commit (no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_new() {
        let c = Commit::new(Hash::ZERO, None, "author", "message");
        assert_eq!(c.tree, Hash::ZERO);
        assert_eq!(c.author, "author");
        assert_eq!(c.message, "message");
        assert!(c.is_root());
        assert!(c.timestamp > 0);
    }

    #[test]
    fn test_commit_with_parent() {
        let parent = Hash::from_hex(
            "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789",
        )
        .unwrap();
        let c = Commit::new(Hash::ZERO, Some(parent), "author", "message");
        assert!(!c.is_root());
        assert_eq!(c.parent, Some(parent));
    }

    #[test]
    fn test_commit_cbor_roundtrip() {
        let parent = Hash::from_hex(
            "1111111111111111111111111111111111111111111111111111111111111111",
        )
        .unwrap();
        for c in [
            Commit::with_timestamp(Hash::ZERO, None, "author", 1234567890, "root"),
            Commit::with_timestamp(Hash::ZERO, Some(parent), "author", 1234567890, "child"),
        ] {
            let mut bytes = Vec::new();
            ciborium::into_writer(&c, &mut bytes).unwrap();

            let parsed: Commit = ciborium::from_reader(&bytes[..]).unwrap();
            assert_eq!(c, parsed);
        }
    }
}
