/// classification of one path in a diff
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// present on the new side only
    Added,
    /// content digest differs
    Modified,
    /// same content, different mode
    ModeChanged,
    /// present on the old side only (report-only, never auto-staged)
    Removed,
    /// tracked in the index but gone from the filesystem
    Missing,
    Unchanged,
}

impl ChangeKind {
    pub fn is_change(&self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "A"),
            ChangeKind::Modified => write!(f, "M"),
            ChangeKind::ModeChanged => write!(f, "m"),
            ChangeKind::Removed => write!(f, "D"),
            ChangeKind::Missing => write!(f, "!"),
            ChangeKind::Unchanged => write!(f, " "),
        }
    }
}

/// entry in a diff result
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffEntry {
    pub path: String,
    pub kind: ChangeKind,
}

impl DiffEntry {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl std::fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}
